//! Strongly typed identifiers for providers and WeChat users.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (provider, openid, unionid).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (provider, openid, unionid).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed byte length.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (provider, openid, unionid).
		kind: &'static str,
		/// Maximum permitted length.
		max: usize,
	},
}

def_id! { ProviderId, "Identifier for an OAuth provider descriptor.", "Provider" }
def_id! { OpenId, "Per-app WeChat user identifier (`openid`).", "OpenId" }
def_id! { UnionId, "Cross-app WeChat user identifier shared by one developer account (`unionid`).", "UnionId" }

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_reject_padding_and_empty_values() {
		assert!(OpenId::new(" o6_bmjrPTlm6_2sgVt7hMZOPfL2M").is_err());
		assert!(OpenId::new("o6_bmjrPTlm6_2sgVt7hMZOPfL2M ").is_err());

		let openid = OpenId::new("o6_bmjrPTlm6_2sgVt7hMZOPfL2M")
			.expect("Openid fixture should be considered valid.");

		assert_eq!(openid.as_ref(), "o6_bmjrPTlm6_2sgVt7hMZOPfL2M");
		assert!(UnionId::new("").is_err());
		assert!(ProviderId::new("with space").is_err());
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let unionid: UnionId = serde_json::from_str("\"o6_bmasdasdsad6_2sgVt7hMZOPfL\"")
			.expect("Unionid should deserialize successfully.");

		assert_eq!(&*unionid, "o6_bmasdasdsad6_2sgVt7hMZOPfL");
		assert!(serde_json::from_str::<OpenId>("\"with space\"").is_err());
		assert!(serde_json::from_str::<OpenId>("\"\"").is_err());
	}

	#[test]
	fn unicode_whitespace_and_length_limits() {
		let nbsp = format!("open{}id", '\u{00A0}');

		assert!(OpenId::new(&nbsp).is_err());

		OpenId::new("a".repeat(IDENTIFIER_MAX_LEN)).expect("Exact length should succeed.");

		let err = OpenId::new("a".repeat(IDENTIFIER_MAX_LEN + 1))
			.expect_err("Overlong identifiers must be rejected.");

		assert_eq!(err, IdentifierError::TooLong { kind: "OpenId", max: IDENTIFIER_MAX_LEN });
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<OpenId, u8> = HashMap::from_iter([(
			OpenId::new("openid-123").expect("Openid used for lookup should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("openid-123"), Some(&7));
	}
}
