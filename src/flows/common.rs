//! Shared helpers for flow implementations (observation, grant checks, token lookups).

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, OpenId},
	error::ConfigError,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::{GrantType, ProviderDescriptor},
};

/// Runs `fut` inside a flow span and records its attempt and outcome.
pub(crate) async fn observe<F, T>(kind: FlowKind, stage: &'static str, fut: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	let span = FlowSpan::new(kind, stage);

	obs::record_flow_outcome(kind, FlowOutcome::Attempt);

	let result = span.instrument(fut).await;

	record_outcome(kind, &result);

	result
}

/// Records the success or failure of a finished flow.
pub(crate) fn record_outcome<T>(kind: FlowKind, result: &Result<T>) {
	match result {
		Ok(_) => obs::record_flow_outcome(kind, FlowOutcome::Success),
		Err(_) => obs::record_flow_outcome(kind, FlowOutcome::Failure),
	}
}

/// Fails with [`ConfigError::UnsupportedGrant`] when the descriptor disables `grant`.
pub(crate) fn ensure_grant(
	descriptor: &ProviderDescriptor,
	grant: GrantType,
) -> Result<(), ConfigError> {
	if descriptor.supports(grant) {
		Ok(())
	} else {
		Err(ConfigError::UnsupportedGrant {
			descriptor: descriptor.id.to_string(),
			grant: grant.as_str(),
		})
	}
}

/// Returns the token's `openid`, which every user-scoped API requires.
pub(crate) fn require_openid(token: &AccessToken) -> Result<&OpenId, ConfigError> {
	token.openid.as_ref().ok_or(ConfigError::MissingOpenId)
}

/// Drops blank values so optional inputs behave like absent ones.
pub(crate) fn non_blank(value: &str) -> Option<&str> {
	let trimmed = value.trim();

	if trimmed.is_empty() { None } else { Some(trimmed) }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::provider::SupportedGrants;

	#[test]
	fn unsupported_grants_name_the_descriptor() {
		let mut descriptor = ProviderDescriptor::wechat().expect("WeChat preset should build.");

		assert!(ensure_grant(&descriptor, GrantType::RefreshToken).is_ok());

		descriptor.supported_grants =
			SupportedGrants::default().enable(GrantType::AuthorizationCode);

		let err = ensure_grant(&descriptor, GrantType::RefreshToken)
			.expect_err("Disabled refresh grant should fail.");

		assert!(matches!(
			err,
			ConfigError::UnsupportedGrant { ref descriptor, grant: "refresh_token" }
				if descriptor == "wechat"
		));
	}

	#[test]
	fn openid_is_required() {
		let token = AccessToken::builder()
			.access_token("ACCESS")
			.build()
			.expect("Token fixture should build.");

		assert!(matches!(require_openid(&token), Err(ConfigError::MissingOpenId)));
		assert_eq!(non_blank("  "), None);
		assert_eq!(non_blank(" code "), Some("code"));
	}

	#[tokio::test]
	async fn observe_passes_results_through() {
		let ok = observe(FlowKind::VerifyToken, "test", async { Ok(7) }).await;
		let err = observe::<_, ()>(FlowKind::VerifyToken, "test", async {
			Err(ConfigError::MissingCode.into())
		})
		.await;

		assert_eq!(ok.expect("Successful futures should pass through."), 7);
		assert!(err.is_err());
	}
}
