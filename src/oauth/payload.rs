//! Normalization of WeChat JSON payloads.
//!
//! WeChat reports failures inside a `200 OK` body as `{"errcode": .., "errmsg": ..}` and sends
//! successful payloads with provider-specific field names. The decoders here branch on `errcode`
//! and reshape success payloads into crate types.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, OpenId, ScopeSet, UnionId},
	error::{ConfigError, TransientError},
};

type JsonObject = serde_json::Map<String, JsonValue>;

/// Error payload returned by the WeChat API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Numeric error code (`errcode`).
	#[serde(rename = "errcode")]
	pub error: i64,
	/// Provider message (`errmsg`).
	#[serde(rename = "errmsg", default)]
	pub error_description: String,
}

/// Decoded API payload: either the expected value or a provider error.
#[derive(Clone, Debug, PartialEq)]
pub enum ApiResponse<T> {
	/// Payload without a non-zero `errcode`.
	Success(T),
	/// Payload carrying a non-zero `errcode`.
	Error(ErrorResponse),
}

/// Decoded token endpoint payload.
pub type TokenResponse = ApiResponse<AccessToken>;

#[derive(Deserialize)]
struct TokenPayload {
	access_token: String,
	#[serde(default)]
	refresh_token: Option<String>,
	#[serde(default)]
	expires_in: Option<serde_json::Number>,
	#[serde(default)]
	openid: Option<String>,
	#[serde(default)]
	unionid: Option<String>,
	#[serde(default)]
	scope: Option<String>,
	#[serde(default)]
	token_type: Option<String>,
	#[serde(flatten)]
	extra: BTreeMap<String, JsonValue>,
}

/// Decodes a token endpoint body issued at `issued_at`.
///
/// Scopes are split on `delimiter` (and whitespace). Fields the normalized shape does not name,
/// other than `errcode`/`errmsg`, are kept in [`AccessToken::other_params`].
pub fn decode_token_response(
	body: &[u8],
	delimiter: char,
	issued_at: OffsetDateTime,
) -> Result<TokenResponse> {
	decode_token_response_with_status(body, delimiter, issued_at, None)
}

/// Decodes a user-info or verification body into `T`, or the provider error it carries.
pub fn decode_api_response<T>(body: &[u8]) -> Result<ApiResponse<T>>
where
	T: DeserializeOwned,
{
	decode_api_response_with_status(body, None)
}

pub(crate) fn decode_token_response_with_status(
	body: &[u8],
	delimiter: char,
	issued_at: OffsetDateTime,
	status: Option<u16>,
) -> Result<TokenResponse> {
	let object = match split_error(parse_object(body, status)?) {
		Ok(object) => object,
		Err(error) => return Ok(ApiResponse::Error(error)),
	};
	let payload: TokenPayload = from_object(object, status)?;

	Ok(ApiResponse::Success(normalize_token(payload, delimiter, issued_at)?))
}

pub(crate) fn decode_api_response_with_status<T>(
	body: &[u8],
	status: Option<u16>,
) -> Result<ApiResponse<T>>
where
	T: DeserializeOwned,
{
	match split_error(parse_object(body, status)?) {
		Ok(object) => Ok(ApiResponse::Success(from_object(object, status)?)),
		Err(error) => Ok(ApiResponse::Error(error)),
	}
}

/// Reads `errcode`/`errmsg` from an arbitrary body, if it is a JSON object carrying them.
pub(crate) fn probe_error(body: &[u8]) -> Option<(Option<i64>, Option<String>)> {
	let object = serde_json::from_slice::<JsonObject>(body).ok()?;
	let code = object.get("errcode").and_then(errcode);
	let message = object.get("errmsg").and_then(JsonValue::as_str).map(str::to_owned);

	if code.is_none() && message.is_none() { None } else { Some((code, message)) }
}

fn parse_object(body: &[u8], status: Option<u16>) -> Result<JsonObject> {
	let deserializer = &mut serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(deserializer)
		.map_err(|source| TransientError::ResponseParse { source, status }.into())
}

fn from_object<T>(object: JsonObject, status: Option<u16>) -> Result<T>
where
	T: DeserializeOwned,
{
	serde_path_to_error::deserialize(JsonValue::Object(object))
		.map_err(|source| TransientError::ResponseParse { source, status }.into())
}

fn split_error(mut object: JsonObject) -> Result<JsonObject, ErrorResponse> {
	match object.get("errcode").and_then(errcode) {
		Some(code) if code != 0 => Err(ErrorResponse {
			error: code,
			error_description: object
				.get("errmsg")
				.and_then(JsonValue::as_str)
				.unwrap_or_default()
				.to_owned(),
		}),
		_ => {
			object.remove("errcode");
			object.remove("errmsg");

			Ok(object)
		},
	}
}

/// Reads an `errcode` sent either as a JSON number or as a numeric string.
fn errcode(value: &JsonValue) -> Option<i64> {
	match value {
		JsonValue::String(raw) => raw.trim().parse().ok(),
		other => other.as_i64(),
	}
}

fn normalize_token(
	payload: TokenPayload,
	delimiter: char,
	issued_at: OffsetDateTime,
) -> Result<AccessToken> {
	let mut builder = AccessToken::builder().access_token(payload.access_token).issued_at(issued_at);

	if let Some(expires_in) = payload.expires_in {
		let seconds = expires_in.as_i64().ok_or(ConfigError::ExpiresInOutOfRange)?;

		if seconds <= 0 {
			return Err(ConfigError::NonPositiveExpiresIn.into());
		}

		let expires_at = issued_at
			.checked_add(Duration::seconds(seconds))
			.ok_or(ConfigError::ExpiresInOutOfRange)?;

		builder = builder.expires_at(expires_at);
	}
	if let Some(refresh) = payload.refresh_token {
		builder = builder.refresh_token(refresh);
	}
	if let Some(openid) = payload.openid {
		builder = builder.openid(OpenId::new(openid).map_err(ConfigError::from)?);
	}
	if let Some(unionid) = payload.unionid.filter(|id| !id.is_empty()) {
		builder = builder.unionid(UnionId::new(unionid).map_err(ConfigError::from)?);
	}
	if let Some(scope) = payload.scope {
		builder = builder
			.scope(ScopeSet::parse_delimited(&scope, delimiter).map_err(ConfigError::from)?);
	}
	if let Some(token_type) = payload.token_type.filter(|kind| !kind.is_empty()) {
		builder = builder.token_type(token_type);
	}
	for (key, value) in payload.extra {
		builder = builder.other_param(key, value);
	}

	Ok(builder.build().map_err(ConfigError::from)?)
}
