//! Refresh token flow.
//!
//! WeChat access tokens live for two hours and refresh tokens for thirty days. A refresh keeps the
//! refresh token valid, so [`OAuthClient::refresh`] carries the previous one forward whenever the
//! response omits it.

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	error::ConfigError,
	flows::{OAuthClient, common},
	http::ApiHttpClient,
	oauth::TransportErrorMapper,
	obs::FlowKind,
	provider::GrantType,
};

impl<C, M> OAuthClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges a raw refresh token for a new access token.
	///
	/// Sends `GET {refresh}?appid=..&grant_type=refresh_token&refresh_token=..`.
	pub async fn refresh_token(&self, refresh_token: &str) -> Result<AccessToken> {
		common::observe(FlowKind::Refresh, "refresh_token", self.refresh_token_inner(refresh_token))
			.await
	}

	/// Refreshes `token` using its stored refresh token.
	///
	/// Identifiers and the refresh token missing from the response are copied from `token`.
	pub async fn refresh(&self, token: &AccessToken) -> Result<AccessToken> {
		common::observe(FlowKind::Refresh, "refresh", async move {
			let refresh = token.refresh_token.as_ref().ok_or(ConfigError::MissingRefreshToken)?;
			let mut refreshed = self.refresh_token_inner(refresh.expose()).await?;

			if refreshed.refresh_token.is_none() {
				refreshed.refresh_token = token.refresh_token.clone();
			}
			if refreshed.openid.is_none() {
				refreshed.openid = token.openid.clone();
			}
			if refreshed.unionid.is_none() {
				refreshed.unionid = token.unionid.clone();
			}

			Ok(refreshed)
		})
		.await
	}

	async fn refresh_token_inner(&self, refresh_token: &str) -> Result<AccessToken> {
		const GRANT: GrantType = GrantType::RefreshToken;

		common::ensure_grant(&self.descriptor, GRANT)?;

		let refresh_token =
			common::non_blank(refresh_token).ok_or(ConfigError::MissingRefreshToken)?;
		let quirks = &self.descriptor.quirks;
		let mut query = BTreeMap::new();

		query.insert(quirks.client_id_param.clone(), self.client_id.clone());
		query.insert("grant_type".to_owned(), GRANT.as_str().to_owned());
		query.insert("refresh_token".to_owned(), refresh_token.to_owned());

		self.strategy.augment_token_request(GRANT, &mut query);

		let facade = self.facade();

		facade
			.fetch_token(
				self.strategy.as_ref(),
				GRANT,
				&self.descriptor.endpoints.refresh,
				query,
				quirks.scope_delimiter,
			)
			.await
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::*, provider::SupportedGrants};

	#[tokio::test]
	async fn refresh_requires_a_stored_refresh_token() {
		let client = build_reqwest_test_client("https://127.0.0.1:9");
		let token =
			AccessToken::builder().access_token("ACCESS").build().expect("Token should build.");
		let err = client.refresh(&token).await.expect_err("Missing refresh token should fail.");

		assert!(matches!(err, Error::Config(ConfigError::MissingRefreshToken)));
	}

	#[tokio::test]
	async fn disabled_refresh_grant_is_rejected() {
		let mut client = build_reqwest_test_client("https://127.0.0.1:9");

		client.descriptor.supported_grants =
			SupportedGrants::default().enable(GrantType::AuthorizationCode);

		let err =
			client.refresh_token("REFRESH").await.expect_err("Disabled grant should fail.");

		assert!(matches!(err, Error::Config(ConfigError::UnsupportedGrant { .. })));
	}
}
