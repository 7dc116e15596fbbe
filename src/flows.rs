//! High-level WeChat flows powered by the API facade.

pub mod authorize;
pub mod callback;
pub mod common;
pub mod exchange;
pub mod refresh;
pub mod user_info;

pub use authorize::*;
pub use callback::*;

// self
use crate::{
	_prelude::*,
	auth::Secret,
	config::ClientOptions,
	error::ConfigError,
	http::ApiHttpClient,
	oauth::{ApiFacade, TransportErrorMapper},
	provider::{ProviderDescriptor, ProviderStrategy},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper, provider::WechatStrategy};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestOAuthClient = OAuthClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Runs WeChat OAuth 2.0 flows against a single provider descriptor.
///
/// The client owns the HTTP client, provider descriptor, and strategy references so individual
/// flows can focus on request shaping. App credentials live alongside the descriptor so the
/// provider's parameter names apply consistently across endpoints.
#[derive(Clone)]
pub struct OAuthClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Provider descriptor that defines endpoints and quirks.
	pub descriptor: ProviderDescriptor,
	/// Strategy responsible for request adjustments and error classification.
	pub strategy: Arc<dyn ProviderStrategy>,
	/// App identifier (`appid`).
	pub client_id: String,
	/// App secret, required for the code exchange.
	pub client_secret: Option<Secret>,
	/// Default callback URL used by authorize requests that do not carry one.
	pub redirect_uri: Option<Url>,
	/// Language requested for user profiles.
	pub lang: Option<String>,
}
impl<C, M> OAuthClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		descriptor: ProviderDescriptor,
		strategy: Arc<dyn ProviderStrategy>,
		client_id: impl Into<String>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			descriptor,
			strategy,
			client_id: client_id.into(),
			client_secret: None,
			redirect_uri: None,
			lang: None,
		}
	}

	/// Applies `options` to `descriptor` and builds a client from the result.
	///
	/// Fails when the options carry no `client_id` or when the rewritten descriptor does not
	/// validate.
	pub fn configure(
		descriptor: ProviderDescriptor,
		strategy: Arc<dyn ProviderStrategy>,
		options: &ClientOptions,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		let client_id = options
			.client_id
			.as_deref()
			.map(str::trim)
			.filter(|id| !id.is_empty())
			.ok_or(ConfigError::MissingClientId)?;
		let descriptor = options.apply(descriptor)?;
		let mut client =
			Self::with_http_client(descriptor, strategy, client_id, http_client, mapper);

		client.client_secret = options.client_secret.clone();
		client.redirect_uri = options.redirect_uri.clone();
		client.lang = options.lang.clone();

		Ok(client)
	}

	/// Sets or replaces the app secret.
	pub fn with_client_secret(mut self, secret: impl Into<Secret>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Sets the default redirect URI for authorize requests.
	pub fn with_redirect_uri(mut self, redirect_uri: Url) -> Self {
		self.redirect_uri = Some(redirect_uri);

		self
	}

	/// Sets the language requested for user profiles.
	pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
		self.lang = Some(lang.into());

		self
	}

	pub(crate) fn facade(&self) -> ApiFacade<C, M> {
		ApiFacade::new(self.http_client.clone(), self.transport_mapper.clone())
	}
}
#[cfg(feature = "reqwest")]
impl OAuthClient<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a new client for the provided descriptor and app identifier.
	///
	/// The client provisions its own reqwest-backed transport so callers do not need to pass
	/// HTTP handles explicitly. Use [`OAuthClient::with_client_secret`] to attach the app secret.
	pub fn new(
		descriptor: ProviderDescriptor,
		strategy: Arc<dyn ProviderStrategy>,
		client_id: impl Into<String>,
	) -> Self {
		Self::with_http_client(
			descriptor,
			strategy,
			client_id,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}

	/// Builds a WeChat website-login client from `options`.
	pub fn wechat(options: &ClientOptions) -> Result<Self> {
		Self::wechat_with(ProviderDescriptor::wechat().map_err(ConfigError::from)?, options)
	}

	/// Builds a WeChat official-account client from `options`.
	pub fn wechat_official_account(options: &ClientOptions) -> Result<Self> {
		Self::wechat_with(
			ProviderDescriptor::wechat_official_account().map_err(ConfigError::from)?,
			options,
		)
	}

	fn wechat_with(descriptor: ProviderDescriptor, options: &ClientOptions) -> Result<Self> {
		Self::configure(
			descriptor,
			Arc::new(WechatStrategy),
			options,
			ReqwestHttpClient::try_new()?,
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Debug for OAuthClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthClient")
			.field("descriptor", &self.descriptor)
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("redirect_uri", &self.redirect_uri)
			.field("lang", &self.lang)
			.finish()
	}
}
