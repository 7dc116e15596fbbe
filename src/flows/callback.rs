//! Callback handling: turn the `code` WeChat redirected with into an authenticated identity.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, OpenId, UnionId, UserInfo},
	flows::{OAuthClient, common},
	http::ApiHttpClient,
	oauth::TransportErrorMapper,
	obs::FlowKind,
};

/// Identity resolved from a successful callback.
#[derive(Clone, Debug, PartialEq)]
pub struct Authentication {
	/// Stable per-app user identifier (`openid`).
	pub uid: OpenId,
	/// Cross-app identifier, from the token response or the profile.
	pub unionid: Option<UnionId>,
	/// Normalized access token.
	pub token: AccessToken,
	/// Profile, fetched only when the granted scope allows it.
	pub user: Option<UserInfo>,
}

impl<C, M> OAuthClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges `code` and, when the scope permits, fetches the user's profile.
	///
	/// Silent `snsapi_base` logins yield only the `openid`; the profile call is skipped for them.
	/// When the token response carries no scope, the descriptor's default scope decides.
	pub async fn authenticate(&self, code: &str) -> Result<Authentication> {
		common::observe(FlowKind::Authenticate, "authenticate", async move {
			let token = self.exchange_code_inner(code).await?;
			let uid = common::require_openid(&token)?.clone();
			let scope =
				if token.scope.is_empty() { &self.descriptor.default_scope } else { &token.scope };
			let user = if scope.grants_user_info() {
				Some(self.fetch_user_info_inner(&token).await?)
			} else {
				None
			};
			let unionid = token
				.unionid
				.clone()
				.or_else(|| user.as_ref().and_then(|profile| profile.unionid.clone()));

			Ok(Authentication { uid, unionid, token, user })
		})
		.await
	}
}
