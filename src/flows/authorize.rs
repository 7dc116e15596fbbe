//! Authorize URL construction.
//!
//! WeChat expects the query parameters in a fixed order and a literal `#wechat_redirect`
//! fragment at the end of the URL; without the fragment the in-WeChat browser shows an error
//! page instead of the consent screen.

// self
use crate::{
	_prelude::*,
	auth::ScopeSet,
	error::ConfigError,
	flows::{OAuthClient, common},
	http::ApiHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Caller input for [`OAuthClient::authorize_url`].
///
/// Unset fields fall back to the client's redirect URI and the descriptor's default scope.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorizeRequest {
	/// Callback URL overriding the client default.
	pub redirect_uri: Option<Url>,
	/// Scope overriding the descriptor default.
	pub scope: Option<ScopeSet>,
	/// Opaque value echoed back on the callback; never generated or checked here.
	pub state: Option<String>,
	/// Extra query parameters appended after the standard ones.
	pub extra: Vec<(String, String)>,
}
impl AuthorizeRequest {
	/// Creates an empty request that uses every default.
	pub fn new() -> Self {
		Self::default()
	}

	/// Overrides the callback URL.
	pub fn with_redirect_uri(mut self, redirect_uri: Url) -> Self {
		self.redirect_uri = Some(redirect_uri);

		self
	}

	/// Overrides the requested scope.
	pub fn with_scope(mut self, scope: ScopeSet) -> Self {
		self.scope = Some(scope);

		self
	}

	/// Sets the opaque `state` value.
	pub fn with_state(mut self, state: impl Into<String>) -> Self {
		self.state = Some(state.into());

		self
	}

	/// Appends an extra query parameter.
	///
	/// A key that matches a standard parameter replaces its value in place.
	pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.extra.push((key.into(), value.into()));

		self
	}
}

impl<C, M> OAuthClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the URL end users are redirected to for consent.
	///
	/// Parameters are emitted as `appid`, `redirect_uri`, `response_type=code`, `scope` (omitted
	/// when empty), `state` (when set), then the request's extras. The descriptor's authorize
	/// fragment, if any, is appended last.
	pub fn authorize_url(&self, request: AuthorizeRequest) -> Result<Url> {
		const KIND: FlowKind = FlowKind::Authorize;

		let _guard = FlowSpan::new(KIND, "authorize_url").entered();

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = self.build_authorize_url(request);

		common::record_outcome(KIND, &result);

		result
	}

	fn build_authorize_url(&self, request: AuthorizeRequest) -> Result<Url> {
		let quirks = &self.descriptor.quirks;
		let redirect_uri = request
			.redirect_uri
			.as_ref()
			.or(self.redirect_uri.as_ref())
			.ok_or(ConfigError::MissingRedirectUri)?;
		let scope = request.scope.as_ref().unwrap_or(&self.descriptor.default_scope);
		let mut params = vec![
			(quirks.client_id_param.clone(), self.client_id.clone()),
			("redirect_uri".to_owned(), redirect_uri.to_string()),
			("response_type".to_owned(), "code".to_owned()),
		];

		if let Some(scope) = scope.join(quirks.scope_delimiter) {
			params.push(("scope".into(), scope));
		}
		if let Some(state) = request.state.filter(|state| !state.is_empty()) {
			params.push(("state".into(), state));
		}

		for (key, value) in request.extra {
			match params.iter_mut().find(|(existing, _)| *existing == key) {
				Some(slot) => slot.1 = value,
				None => params.push((key, value)),
			}
		}

		let mut url = self.descriptor.endpoints.authorization.clone();

		url.query_pairs_mut().extend_pairs(params);
		url.set_fragment(quirks.authorize_fragment.as_deref());

		Ok(url)
	}
}
