//! Internal API facade and transport error mapping.
//!
//! WeChat's token endpoints take `GET` requests with query parameters and answer with JSON sent
//! as `text/plain`, so the facade drives the `oauth2` transport abstraction directly instead of
//! the crate's RFC 6749 request builders.

pub mod payload;

pub use oauth2;

// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest,
	http::{Method, header::ACCEPT},
};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	error::{ConfigError, TransientError, TransportError},
	http::{ApiHttpClient, ResponseMetadata, ResponseMetadataSlot},
	obs,
	oauth::payload::{ApiResponse, ErrorResponse},
	provider::{GrantType, ProviderCall, ProviderErrorContext, ProviderErrorKind, ProviderStrategy},
};

type FacadeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a crate error.
	fn map_transport_error(
		&self,
		strategy: &dyn ProviderStrategy,
		call: ProviderCall,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		strategy: &dyn ProviderStrategy,
		call: ProviderCall,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(strategy, call, meta, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => map_generic_transport_error(call, meta, message),
			_ => map_unknown_transport_error(call, meta),
		}
	}
}

/// Raw provider response that passed the HTTP status check.
struct ApiBody {
	status: Option<u16>,
	body: Vec<u8>,
}

pub(crate) struct ApiFacade<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> ApiFacade<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn new(http_client: impl Into<Arc<C>>, error_mapper: impl Into<Arc<M>>) -> Self {
		Self { http_client: http_client.into(), error_mapper: error_mapper.into() }
	}

	/// Calls a token endpoint and normalizes the payload into an [`AccessToken`].
	pub(crate) fn fetch_token<'a, 'strategy, 'endpoint>(
		&'a self,
		strategy: &'strategy dyn ProviderStrategy,
		grant: GrantType,
		endpoint: &'endpoint Url,
		query: BTreeMap<String, String>,
		scope_delimiter: char,
	) -> FacadeFuture<'a, AccessToken>
	where
		'strategy: 'a,
		'endpoint: 'a,
	{
		let call = ProviderCall::Token(grant);

		Box::pin(async move {
			let response = self.dispatch(strategy, call, endpoint, &query).await?;
			let issued_at = OffsetDateTime::now_utc();

			match payload::decode_token_response_with_status(
				&response.body,
				scope_delimiter,
				issued_at,
				response.status,
			)? {
				ApiResponse::Success(token) => Ok(token),
				ApiResponse::Error(error) =>
					Err(map_error_response(strategy, call, response.status, &error)),
			}
		})
	}

	/// Calls a user-facing API endpoint and decodes the payload into `T`.
	pub(crate) fn fetch_json<'a, 'strategy, 'endpoint, T>(
		&'a self,
		strategy: &'strategy dyn ProviderStrategy,
		call: ProviderCall,
		endpoint: &'endpoint Url,
		query: BTreeMap<String, String>,
	) -> FacadeFuture<'a, T>
	where
		'strategy: 'a,
		'endpoint: 'a,
		T: 'a + Send + DeserializeOwned,
	{
		Box::pin(async move {
			let response = self.dispatch(strategy, call, endpoint, &query).await?;

			match payload::decode_api_response_with_status(&response.body, response.status)? {
				ApiResponse::Success(value) => Ok(value),
				ApiResponse::Error(error) =>
					Err(map_error_response(strategy, call, response.status, &error)),
			}
		})
	}

	async fn dispatch(
		&self,
		strategy: &dyn ProviderStrategy,
		call: ProviderCall,
		endpoint: &Url,
		query: &BTreeMap<String, String>,
	) -> Result<ApiBody> {
		let request = build_get_request(endpoint, query)?;
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let response = instrumented.call(request).await.map_err(|err| {
			self.error_mapper.map_transport_error(strategy, call, meta.take().as_ref(), err)
		})?;
		let status = response.status();
		let meta = meta
			.take()
			.unwrap_or(ResponseMetadata { status: Some(status.as_u16()), retry_after: None });

		if !status.is_success() {
			return Err(map_status_error(strategy, call, &meta, response.body()));
		}

		Ok(ApiBody { status: meta.status, body: response.into_body() })
	}
}

fn build_get_request(
	endpoint: &Url,
	query: &BTreeMap<String, String>,
) -> Result<HttpRequest, ConfigError> {
	let mut url = endpoint.clone();

	if !query.is_empty() {
		url.query_pairs_mut().extend_pairs(query.iter());
	}

	Ok(oauth2::http::Request::builder()
		.method(Method::GET)
		.uri(url.as_str())
		.header(ACCEPT, "application/json")
		.body(Vec::new())?)
}

fn map_error_response(
	strategy: &dyn ProviderStrategy,
	call: ProviderCall,
	status: Option<u16>,
	response: &ErrorResponse,
) -> Error {
	let mut ctx = ProviderErrorContext::new(call)
		.with_error_code(response.error)
		.with_error_message(response.error_description.clone());

	if let Some(status) = status {
		ctx = ctx.with_http_status(status);
	}

	obs::log_provider_rejection(
		call,
		Some(response.error),
		Some(response.error_description.as_str()),
	);

	classify(strategy, &ctx, None)
}

fn map_status_error(
	strategy: &dyn ProviderStrategy,
	call: ProviderCall,
	meta: &ResponseMetadata,
	body: &[u8],
) -> Error {
	let mut ctx = ProviderErrorContext::new(call);

	if let Some(status) = meta.status {
		ctx = ctx.with_http_status(status);
	}

	match payload::probe_error(body) {
		Some((code, message)) => {
			if let Some(code) = code {
				ctx = ctx.with_error_code(code);
			}
			if let Some(message) = message {
				ctx = ctx.with_error_message(message);
			}
		},
		None => ctx = ctx.with_body_preview(String::from_utf8_lossy(body)),
	}

	obs::log_provider_rejection(call, ctx.error_code, ctx.error_message.as_deref());

	classify(strategy, &ctx, meta.retry_after)
}

fn classify(
	strategy: &dyn ProviderStrategy,
	ctx: &ProviderErrorContext,
	retry_after: Option<Duration>,
) -> Error {
	let reason = ctx.reason();

	match strategy.classify_error(ctx) {
		ProviderErrorKind::InvalidGrant => Error::InvalidGrant { reason },
		ProviderErrorKind::InvalidClient => Error::InvalidClient { reason },
		ProviderErrorKind::InsufficientScope => Error::InsufficientScope { reason },
		ProviderErrorKind::Transient =>
			TransientError::Endpoint { message: reason, status: ctx.http_status, retry_after }
				.into(),
		ProviderErrorKind::Rejected => Error::Rejected { code: ctx.error_code, reason },
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(
	_strategy: &dyn ProviderStrategy,
	call: ProviderCall,
	meta: Option<&ResponseMetadata>,
	err: ReqwestError,
) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransientError::Endpoint {
			message: format!("Request timed out while calling the {call} endpoint"),
			status: meta_status(meta).or_else(|| err.status().map(|code| code.as_u16())),
			retry_after: meta_retry_after(meta),
		}
		.into();
	}

	TransportError::from(err).into()
}

#[cfg(feature = "reqwest")]
fn map_generic_transport_error(
	call: ProviderCall,
	meta: Option<&ResponseMetadata>,
	message: impl Display,
) -> Error {
	TransientError::Endpoint {
		message: format!("HTTP client error occurred while calling the {call} endpoint: {message}"),
		status: meta_status(meta),
		retry_after: meta_retry_after(meta),
	}
	.into()
}

#[cfg(feature = "reqwest")]
fn map_unknown_transport_error(call: ProviderCall, meta: Option<&ResponseMetadata>) -> Error {
	TransientError::Endpoint {
		message: format!("HTTP client error occurred while calling the {call} endpoint"),
		status: meta_status(meta),
		retry_after: meta_retry_after(meta),
	}
	.into()
}

#[cfg(feature = "reqwest")]
fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

#[cfg(feature = "reqwest")]
fn meta_retry_after(meta: Option<&ResponseMetadata>) -> Option<Duration> {
	meta.and_then(|value| value.retry_after)
}
