//! Normalized access-token record, lifecycle helpers, and builder.

// self
use crate::{
	_prelude::*,
	auth::{OpenId, ScopeSet, Secret, UnionId},
};

/// Token type reported when the provider omits `token_type`.
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Current lifecycle status for an access token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Token is not yet valid because the issued-at instant is in the future.
	Pending,
	/// Token is currently valid.
	Active,
	/// Token exceeded its expiry instant.
	Expired,
}

/// Errors produced by [`AccessTokenBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum TokenBuilderError {
	/// Issued when no (or an empty) access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
}

/// Provider-neutral access token consumed by authentication pipelines.
///
/// WeChat's `openid`/`unionid` get typed fields; any other keys the provider returned that have
/// no dedicated field are preserved in [`other_params`](Self::other_params).
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
	/// Access token secret; callers must avoid logging it.
	pub access_token: Secret,
	/// Refresh token secret, if the provider issued one.
	pub refresh_token: Option<Secret>,
	/// Token type used when presenting the access token.
	pub token_type: String,
	/// Scopes granted to this token.
	pub scope: ScopeSet,
	/// Per-app user identifier.
	pub openid: Option<OpenId>,
	/// Cross-app user identifier, present once the app is bound to an open-platform account.
	pub unionid: Option<UnionId>,
	/// Instant at which the token response was received.
	pub issued_at: OffsetDateTime,
	/// Expiry instant derived from `issued_at + expires_in`; `None` means no advertised expiry.
	pub expires_at: Option<OffsetDateTime>,
	/// Remaining provider fields.
	pub other_params: BTreeMap<String, JsonValue>,
}
impl AccessToken {
	/// Returns a builder for constructing normalized tokens.
	pub fn builder() -> AccessTokenBuilder {
		AccessTokenBuilder::default()
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		if instant < self.issued_at {
			return TokenStatus::Pending;
		}
		if self.expires_at.is_some_and(|expires_at| instant >= expires_at) {
			return TokenStatus::Expired;
		}

		TokenStatus::Active
	}

	/// Convenience helper that checks the status using the current UTC instant.
	pub fn status(&self) -> TokenStatus {
		self.status_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` if the token has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), TokenStatus::Expired)
	}

	/// Returns `true` if the token is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		matches!(self.status(), TokenStatus::Expired)
	}

	/// Remaining lifetime at `instant`, clamped at zero; `None` without an expiry.
	pub fn expires_in_at(&self, instant: OffsetDateTime) -> Option<Duration> {
		self.expires_at.map(|expires_at| (expires_at - instant).max(Duration::ZERO))
	}

	/// Looks up a provider field that has no dedicated attribute.
	pub fn other_param(&self, key: &str) -> Option<&JsonValue> {
		self.other_params.get(key)
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("token_type", &self.token_type)
			.field("scope", &self.scope)
			.field("openid", &self.openid)
			.field("unionid", &self.unionid)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.field("other_params", &self.other_params)
			.finish()
	}
}

/// Builder for [`AccessToken`].
#[derive(Clone, Debug, Default)]
pub struct AccessTokenBuilder {
	access_token: Option<Secret>,
	refresh_token: Option<Secret>,
	token_type: Option<String>,
	scope: ScopeSet,
	openid: Option<OpenId>,
	unionid: Option<UnionId>,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
	other_params: BTreeMap<String, JsonValue>,
}
impl AccessTokenBuilder {
	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(Secret::new(token));

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(Secret::new(token));

		self
	}

	/// Overrides the token type (defaults to [`DEFAULT_TOKEN_TYPE`]).
	pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}

	/// Sets the granted scopes.
	pub fn scope(mut self, scope: ScopeSet) -> Self {
		self.scope = scope;

		self
	}

	/// Sets the per-app user identifier.
	pub fn openid(mut self, openid: OpenId) -> Self {
		self.openid = Some(openid);

		self
	}

	/// Sets the cross-app user identifier.
	pub fn unionid(mut self, unionid: UnionId) -> Self {
		self.unionid = Some(unionid);

		self
	}

	/// Sets the issued-at instant.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the issued instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Stores an additional provider field.
	pub fn other_param(mut self, key: impl Into<String>, value: JsonValue) -> Self {
		self.other_params.insert(key.into(), value);

		self
	}

	/// Consumes the builder and produces an [`AccessToken`].
	pub fn build(self) -> Result<AccessToken, TokenBuilderError> {
		let access_token = self
			.access_token
			.filter(|secret| !secret.is_empty())
			.ok_or(TokenBuilderError::MissingAccessToken)?;
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => Some(instant),
			(None, Some(delta)) => Some(issued_at + delta),
			(None, None) => None,
		};

		Ok(AccessToken {
			access_token,
			refresh_token: self.refresh_token.filter(|secret| !secret.is_empty()),
			token_type: self.token_type.unwrap_or_else(|| DEFAULT_TOKEN_TYPE.into()),
			scope: self.scope,
			openid: self.openid,
			unionid: self.unionid,
			issued_at,
			expires_at,
			other_params: self.other_params,
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn status_transitions_cover_all_states() {
		let token = AccessToken::builder()
			.access_token("access")
			.refresh_token("refresh")
			.issued_at(macros::datetime!(2025-01-01 00:00 UTC))
			.expires_at(macros::datetime!(2025-01-01 02:00 UTC))
			.build()
			.expect("Access token builder should succeed for status transitions.");

		assert_eq!(token.status_at(macros::datetime!(2024-12-31 23:59 UTC)), TokenStatus::Pending);
		assert_eq!(token.status_at(macros::datetime!(2025-01-01 01:30 UTC)), TokenStatus::Active);
		assert_eq!(token.status_at(macros::datetime!(2025-01-01 02:00 UTC)), TokenStatus::Expired);
	}

	#[test]
	fn builder_resolves_relative_expiry_and_defaults() {
		let token = AccessToken::builder()
			.access_token("secret")
			.issued_at(macros::datetime!(2025-01-01 00:00 UTC))
			.expires_in(Duration::seconds(7200))
			.build()
			.expect("Access token builder should support relative expiry.");

		assert_eq!(token.expires_at, Some(macros::datetime!(2025-01-01 02:00 UTC)));
		assert_eq!(token.token_type, DEFAULT_TOKEN_TYPE);
		assert!(token.refresh_token.is_none());
		assert_eq!(
			token.expires_in_at(macros::datetime!(2025-01-01 01:00 UTC)),
			Some(Duration::hours(1))
		);
		assert_eq!(
			token.expires_in_at(macros::datetime!(2025-01-01 03:00 UTC)),
			Some(Duration::ZERO)
		);
	}

	#[test]
	fn tokens_without_expiry_never_expire() {
		let token = AccessToken::builder()
			.access_token("secret")
			.issued_at(macros::datetime!(2025-01-01 00:00 UTC))
			.build()
			.expect("Tokens without expiry should build.");

		assert!(!token.is_expired_at(macros::datetime!(2099-01-01 00:00 UTC)));
		assert_eq!(token.expires_in_at(macros::datetime!(2025-01-02 00:00 UTC)), None);
	}

	#[test]
	fn builder_rejects_missing_or_empty_access_token() {
		assert_eq!(
			AccessToken::builder().build().expect_err("Missing token must fail."),
			TokenBuilderError::MissingAccessToken
		);
		assert_eq!(
			AccessToken::builder().access_token("").build().expect_err("Empty token must fail."),
			TokenBuilderError::MissingAccessToken
		);
	}

	#[test]
	fn debug_output_redacts_secrets() {
		let token = AccessToken::builder()
			.access_token("very-secret-access")
			.refresh_token("very-secret-refresh")
			.other_param("is_snapshotuser", JsonValue::from(1))
			.build()
			.expect("Access token should build.");
		let rendered = format!("{token:?}");

		assert!(!rendered.contains("very-secret-access"));
		assert!(!rendered.contains("very-secret-refresh"));
		assert!(rendered.contains("is_snapshotuser"));
		assert_eq!(token.other_param("is_snapshotuser"), Some(&JsonValue::from(1)));
	}
}
