//! User profile lookup and access token verification.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, UserInfo},
	flows::{OAuthClient, common},
	http::ApiHttpClient,
	oauth::TransportErrorMapper,
	obs::FlowKind,
	provider::ProviderCall,
};

impl<C, M> OAuthClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Fetches the profile of the user `token` was issued for.
	///
	/// Sends `GET {user_info}?access_token=..&openid=..[&lang=..]`. The token must carry an
	/// `openid` and a scope that grants profile access (`snsapi_login` or `snsapi_userinfo`).
	pub async fn fetch_user_info(&self, token: &AccessToken) -> Result<UserInfo> {
		common::observe(FlowKind::UserInfo, "fetch_user_info", self.fetch_user_info_inner(token))
			.await
	}

	/// Checks with WeChat whether `token` is still valid.
	///
	/// Sends `GET {verify}?access_token=..&openid=..`; WeChat answers `errcode: 0` for a valid
	/// token and a non-zero code otherwise, which surfaces as an error.
	pub async fn verify_access_token(&self, token: &AccessToken) -> Result<()> {
		common::observe(FlowKind::VerifyToken, "verify_access_token", async move {
			let query = self.user_query(token, false)?;
			let facade = self.facade();
			let _ack: JsonValue = facade
				.fetch_json(
					self.strategy.as_ref(),
					ProviderCall::VerifyToken,
					&self.descriptor.endpoints.verify,
					query,
				)
				.await?;

			Ok(())
		})
		.await
	}

	pub(super) async fn fetch_user_info_inner(&self, token: &AccessToken) -> Result<UserInfo> {
		let query = self.user_query(token, true)?;
		let facade = self.facade();

		facade
			.fetch_json(
				self.strategy.as_ref(),
				ProviderCall::UserInfo,
				&self.descriptor.endpoints.user_info,
				query,
			)
			.await
	}

	fn user_query(&self, token: &AccessToken, with_lang: bool) -> Result<BTreeMap<String, String>> {
		let openid = common::require_openid(token)?;
		let mut query = BTreeMap::from([
			("access_token".to_owned(), token.access_token.expose().to_owned()),
			("openid".to_owned(), openid.to_string()),
		]);

		if let Some(lang) = self.lang.as_deref().filter(|_| with_lang).and_then(common::non_blank) {
			query.insert("lang".to_owned(), lang.to_owned());
		}

		Ok(query)
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::*, auth::OpenId, error::ConfigError};

	fn token(openid: Option<&str>) -> AccessToken {
		let mut builder = AccessToken::builder().access_token("ACCESS");

		if let Some(openid) = openid {
			builder = builder.openid(OpenId::new(openid).expect("OpenId fixture should be valid."));
		}

		builder.build().expect("Token fixture should build.")
	}

	#[test]
	fn user_query_adds_lang_only_for_profiles() {
		let client = build_reqwest_test_client("https://127.0.0.1:9").with_lang("en");
		let profile = client.user_query(&token(Some("OPENID")), true).expect("Query should build.");
		let verify = client.user_query(&token(Some("OPENID")), false).expect("Query should build.");

		assert_eq!(profile.get("lang").map(String::as_str), Some("en"));
		assert_eq!(profile.get("openid").map(String::as_str), Some("OPENID"));
		assert!(!verify.contains_key("lang"));
	}

	#[tokio::test]
	async fn missing_openid_fails_before_any_request() {
		let client = build_reqwest_test_client("https://127.0.0.1:9");
		let err = client
			.fetch_user_info(&token(None))
			.await
			.expect_err("Missing openid should fail.");

		assert!(matches!(err, Error::Config(ConfigError::MissingOpenId)));
	}
}
