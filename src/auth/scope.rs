//! Scope modeling helpers.

// std
use std::{collections::BTreeSet, slice::Iter};
// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError, ser::SerializeSeq};
// self
use crate::_prelude::*;

/// Website QR login scope; grants access to the user profile.
pub const SNSAPI_LOGIN: &str = "snsapi_login";
/// Silent official-account scope; yields only the `openid`.
pub const SNSAPI_BASE: &str = "snsapi_base";
/// Official-account scope that asks the user to share their profile.
pub const SNSAPI_USERINFO: &str = "snsapi_userinfo";

/// Errors emitted when validating scopes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ScopeValidationError {
	/// Empty scope entries are not allowed.
	#[error("Scope entries cannot be empty.")]
	Empty,
	/// Scopes cannot contain embedded whitespace characters.
	#[error("Scope contains whitespace: {scope}.")]
	ContainsWhitespace {
		/// The offending scope string.
		scope: String,
	},
}

/// Normalized set of OAuth scopes.
///
/// Scopes are deduplicated and sorted so equality, ordering, and hashing stay consistent no
/// matter how the provider or caller ordered them.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeSet(Arc<[String]>);
impl ScopeSet {
	/// Creates a normalized scope set from any iterator.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Ok(Self(normalize(scopes)?))
	}

	/// Parses a provider-formatted scope string.
	///
	/// Both `delimiter` and whitespace separate entries, and empty pieces are skipped, so
	/// `"snsapi_base, snsapi_userinfo"` and `"snsapi_base,snsapi_userinfo"` parse identically.
	pub fn parse_delimited(raw: &str, delimiter: char) -> Result<Self, ScopeValidationError> {
		Self::new(
			raw.split(|c: char| c == delimiter || c.is_whitespace()).filter(|s| !s.is_empty()),
		)
	}

	/// Number of distinct scopes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no scopes are defined.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns true if the normalized set contains the provided scope.
	pub fn contains(&self, scope: &str) -> bool {
		self.0.binary_search_by(|candidate| candidate.as_str().cmp(scope)).is_ok()
	}

	/// Iterator over normalized scopes.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(|s| s.as_str())
	}

	/// Joins the scopes with the provider's delimiter, or `None` for an empty set.
	pub fn join(&self, delimiter: char) -> Option<String> {
		if self.is_empty() {
			return None;
		}

		let mut buf = String::new();

		for (idx, value) in self.iter().enumerate() {
			if idx > 0 {
				buf.push(delimiter);
			}

			buf.push_str(value);
		}

		Some(buf)
	}

	/// Returns true when the scopes allow calling the user-info API.
	pub fn grants_user_info(&self) -> bool {
		self.contains(SNSAPI_LOGIN) || self.contains(SNSAPI_USERINFO)
	}

	/// Returns the underlying slice of scope strings.
	pub fn as_slice(&self) -> &[String] {
		&self.0
	}
}
impl Debug for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ScopeSet").field(&self.0).finish()
	}
}
impl Display for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0.join(" "))
	}
}

/// Iterator over scope strings.
pub struct ScopeIter<'a> {
	inner: Iter<'a, String>,
}
impl<'a> Iterator for ScopeIter<'a> {
	type Item = &'a str;

	fn next(&mut self) -> Option<Self::Item> {
		self.inner.next().map(|s| s.as_str())
	}
}
impl<'a> IntoIterator for &'a ScopeSet {
	type IntoIter = ScopeIter<'a>;
	type Item = &'a str;

	fn into_iter(self) -> Self::IntoIter {
		ScopeIter { inner: self.0.iter() }
	}
}
impl TryFrom<Vec<String>> for ScopeSet {
	type Error = ScopeValidationError;

	fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl FromStr for ScopeSet {
	type Err = ScopeValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.is_empty() {
			return Ok(Self::default());
		}
		if s.chars().all(char::is_whitespace) {
			return Err(ScopeValidationError::Empty);
		}

		Self::new(s.split_whitespace())
	}
}
impl Serialize for ScopeSet {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut seq = serializer.serialize_seq(Some(self.0.len()))?;

		for scope in self.0.iter() {
			seq.serialize_element(scope)?;
		}

		seq.end()
	}
}
impl<'de> Deserialize<'de> for ScopeSet {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let values = <Vec<String>>::deserialize(deserializer)?;

		ScopeSet::new(values).map_err(DeError::custom)
	}
}

fn normalize<I, S>(scopes: I) -> Result<Arc<[String]>, ScopeValidationError>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	let mut set = BTreeSet::new();

	for scope in scopes {
		let owned: String = scope.into();

		if owned.is_empty() {
			return Err(ScopeValidationError::Empty);
		}
		if owned.chars().any(char::is_whitespace) {
			return Err(ScopeValidationError::ContainsWhitespace { scope: owned });
		}

		set.insert(owned);
	}

	Ok(Arc::from(set.into_iter().collect::<Vec<_>>()))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn scopes_normalize_and_deduplicate() {
		let lhs = ScopeSet::new([SNSAPI_USERINFO, SNSAPI_BASE, SNSAPI_BASE])
			.expect("Left-hand scope set should be valid.");
		let rhs = ScopeSet::new([SNSAPI_BASE, SNSAPI_USERINFO])
			.expect("Right-hand scope set should be valid.");

		assert_eq!(lhs, rhs);
		assert_eq!(lhs.len(), 2);
		assert_eq!(lhs.to_string(), "snsapi_base snsapi_userinfo");
	}

	#[test]
	fn join_uses_provider_delimiter() {
		let scope = ScopeSet::new([SNSAPI_USERINFO, SNSAPI_BASE])
			.expect("Scope fixture should be valid for join test.");

		assert_eq!(scope.join(','), Some("snsapi_base,snsapi_userinfo".into()));
		assert_eq!(scope.join(' '), Some("snsapi_base snsapi_userinfo".into()));
		assert_eq!(ScopeSet::default().join(','), None);
	}

	#[test]
	fn parse_delimited_tolerates_spacing_and_trailing_delimiters() {
		let scope = ScopeSet::parse_delimited("snsapi_base, snsapi_userinfo,", ',')
			.expect("Provider scope string should parse.");

		assert_eq!(scope.as_slice(), ["snsapi_base".to_string(), "snsapi_userinfo".to_string()]);
		assert!(ScopeSet::parse_delimited("", ',').expect("Empty input is valid.").is_empty());
	}

	#[test]
	fn invalid_scopes_error() {
		let err = ScopeSet::new([" profile "]).expect_err("Padded scopes must be rejected.");

		assert!(matches!(err, ScopeValidationError::ContainsWhitespace { .. }));
		assert!(ScopeSet::new([""]).is_err());
		assert!(ScopeSet::from_str("").is_ok(), "Empty string represents an empty scope set.");
		assert!(ScopeSet::from_str("   ").is_err(), "Whitespace-only input must be rejected.");
	}

	#[test]
	fn user_info_capability_follows_scope() {
		let login = ScopeSet::new([SNSAPI_LOGIN]).expect("Login scope should be valid.");
		let base = ScopeSet::new([SNSAPI_BASE]).expect("Base scope should be valid.");

		assert!(login.grants_user_info());
		assert!(!base.grants_user_info());
		assert!(base.contains(SNSAPI_BASE));
	}

	#[test]
	fn serde_uses_sequence_form() {
		let scope = ScopeSet::new([SNSAPI_LOGIN]).expect("Scope fixture should be valid.");
		let payload = serde_json::to_string(&scope).expect("Scope set should serialize.");

		assert_eq!(payload, "[\"snsapi_login\"]");
		assert!(serde_json::from_str::<ScopeSet>("[\"with space\"]").is_err());
	}
}
