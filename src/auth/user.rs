//! WeChat user profile returned by the `/sns/userinfo` API.

// crates.io
use serde::{Deserializer, de::Error as _};
// self
use crate::{
	_prelude::*,
	auth::{OpenId, UnionId},
};

/// Gender reported by WeChat (`sex` field: 0, 1, 2).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum Sex {
	/// Not shared or unknown.
	#[default]
	Unknown,
	/// Male.
	Male,
	/// Female.
	Female,
}
impl From<u8> for Sex {
	fn from(value: u8) -> Self {
		match value {
			1 => Self::Male,
			2 => Self::Female,
			_ => Self::Unknown,
		}
	}
}
impl From<Sex> for u8 {
	fn from(value: Sex) -> Self {
		match value {
			Sex::Unknown => 0,
			Sex::Male => 1,
			Sex::Female => 2,
		}
	}
}

/// Profile of the authenticated user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
	/// Per-app user identifier.
	pub openid: OpenId,
	/// Display name.
	#[serde(default)]
	pub nickname: String,
	/// Reported gender.
	#[serde(default)]
	pub sex: Sex,
	/// Province from the user's profile.
	#[serde(default)]
	pub province: String,
	/// City from the user's profile.
	#[serde(default)]
	pub city: String,
	/// Country code or name from the user's profile.
	#[serde(default)]
	pub country: String,
	/// Avatar URL (`headimgurl`); WeChat sends an empty string when unset.
	#[serde(default, rename = "headimgurl")]
	pub avatar_url: String,
	/// Privileges, e.g. WeChat Pay card holder flags.
	#[serde(default)]
	pub privilege: Vec<String>,
	/// Cross-app user identifier; an empty string counts as absent.
	#[serde(default, deserialize_with = "deserialize_unionid")]
	pub unionid: Option<UnionId>,
}
impl UserInfo {
	/// Avatar URL, if the user has one.
	pub fn avatar(&self) -> Option<&str> {
		Some(self.avatar_url.as_str()).filter(|url| !url.is_empty())
	}

	/// Non-empty country, province, and city joined by spaces.
	pub fn location(&self) -> Option<String> {
		let parts = [&self.country, &self.province, &self.city]
			.into_iter()
			.map(|part| part.trim())
			.filter(|part| !part.is_empty())
			.collect::<Vec<_>>();

		if parts.is_empty() { None } else { Some(parts.join(" ")) }
	}
}

fn deserialize_unionid<'de, D>(deserializer: D) -> Result<Option<UnionId>, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<String>::deserialize(deserializer)? {
		Some(raw) if !raw.is_empty() => UnionId::new(raw).map(Some).map_err(D::Error::custom),
		_ => Ok(None),
	}
}
