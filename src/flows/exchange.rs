//! Authorization code exchange.

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
	/// Exchanges the `code` delivered to the callback for an access token.
	///
	/// Sends `GET {token}?appid=..&secret=..&code=..&grant_type=authorization_code` and
	/// normalizes the response, including `openid`, `unionid`, and the granted scope.
	pub async fn exchange_code(&self, code: &str) -> Result<AccessToken> {
		common::observe(FlowKind::CodeExchange, "exchange_code", self.exchange_code_inner(code))
			.await
	}

	pub(super) async fn exchange_code_inner(&self, code: &str) -> Result<AccessToken> {
		const GRANT: GrantType = GrantType::AuthorizationCode;

		common::ensure_grant(&self.descriptor, GRANT)?;

		let code = common::non_blank(code).ok_or(ConfigError::MissingCode)?;
		let secret = self.client_secret.as_ref().ok_or(ConfigError::MissingClientSecret)?;
		let quirks = &self.descriptor.quirks;
		let mut query = BTreeMap::new();

		query.insert(quirks.client_id_param.clone(), self.client_id.clone());
		query.insert(quirks.client_secret_param.clone(), secret.expose().to_owned());
		query.insert("code".to_owned(), code.to_owned());
		query.insert("grant_type".to_owned(), GRANT.as_str().to_owned());

		self.strategy.augment_token_request(GRANT, &mut query);

		let facade = self.facade();

		facade
			.fetch_token(
				self.strategy.as_ref(),
				GRANT,
				&self.descriptor.endpoints.token,
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
	use crate::_preludet::*;

	#[tokio::test]
	async fn blank_code_fails_before_any_request() {
		let client = build_reqwest_test_client("https://127.0.0.1:9");
		let err = client.exchange_code("  ").await.expect_err("Blank code should fail.");

		assert!(matches!(err, Error::Config(ConfigError::MissingCode)));
	}

	#[tokio::test]
	async fn missing_secret_fails_before_any_request() {
		let mut client = build_reqwest_test_client("https://127.0.0.1:9");

		client.client_secret = None;

		let err = client.exchange_code("CODE").await.expect_err("Missing secret should fail.");

		assert!(matches!(err, Error::Config(ConfigError::MissingClientSecret)));
	}
}
