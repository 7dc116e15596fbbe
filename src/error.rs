//! Crate-level error types shared across flows, providers, and transports.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem or unusable provider payload.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Temporary upstream failure; retry with backoff.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Token lacks the scope required by the called API.
	#[error("Token lacks the required scopes: {reason}.")]
	InsufficientScope {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Provider rejected the grant (bad, used, or expired code or token).
	#[error("Provider rejected the grant: {reason}.")]
	InvalidGrant {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// App credentials were rejected.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Provider returned an error the strategy could not map onto a narrower category.
	#[error("Provider rejected the request: {reason}.")]
	Rejected {
		/// Provider error code (`errcode`), when one was returned.
		code: Option<i64>,
		/// Provider-supplied reason string.
		reason: String,
	},
}
impl Error {
	/// Returns `true` when retrying the same request later may succeed.
	pub fn is_transient(&self) -> bool {
		matches!(self, Self::Transient(_) | Self::Transport(_))
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Provider descriptor failed validation.
	#[error(transparent)]
	InvalidDescriptor(#[from] crate::provider::ProviderDescriptorError),
	/// A configured URL cannot be parsed.
	#[error("Configured URL `{key}` is invalid.")]
	InvalidUrl {
		/// Configuration key holding the URL.
		key: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},

	/// Descriptor does not enable the requested grant.
	#[error("Descriptor `{descriptor}` does not enable the {grant} grant.")]
	UnsupportedGrant {
		/// Provider identifier string.
		descriptor: String,
		/// Disabled grant label.
		grant: &'static str,
	},
	/// No app identifier was configured.
	#[error("Client identifier (appid) is not configured.")]
	MissingClientId,
	/// The app secret is required for the code exchange.
	#[error("Client secret is not configured.")]
	MissingClientSecret,
	/// Neither the request nor the client carries a redirect URI.
	#[error("Redirect URI is not configured.")]
	MissingRedirectUri,
	/// The authorization code is empty.
	#[error("Missing required authorization code.")]
	MissingCode,
	/// The token carries no refresh secret.
	#[error("Access token is missing a refresh token.")]
	MissingRefreshToken,
	/// The token carries no `openid`, which the user APIs require.
	#[error("Access token is missing an openid.")]
	MissingOpenId,
	/// Scopes cannot be normalized.
	#[error("Scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Provider returned an identifier that fails validation.
	#[error("Provider returned an invalid identifier.")]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
	/// Access token builder validation failed.
	#[error("Unable to build access token.")]
	TokenBuild(#[from] crate::auth::TokenBuilderError),
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Token endpoint returned a non-positive duration.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	pub(crate) fn invalid_url(key: impl Into<String>, source: url::ParseError) -> Self {
		Self::InvalidUrl { key: key.into(), source }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Temporary failure variants (safe to retry).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Provider returned an unexpected but non-fatal response.
	#[error("Provider endpoint returned an unexpected response: {message}.")]
	Endpoint {
		/// Provider- or crate-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Provider responded with JSON that could not be parsed.
	#[error("Provider endpoint returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure, including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn transient_helper_covers_retryable_variants() {
		let transient: Error = TransientError::Endpoint {
			message: "system busy".into(),
			status: Some(200),
			retry_after: None,
		}
		.into();

		assert!(transient.is_transient());
		assert!(Error::from(TransportError::Io(std::io::Error::other("reset"))).is_transient());
		assert!(!Error::InvalidGrant { reason: "invalid code".into() }.is_transient());
		assert!(!Error::from(ConfigError::MissingCode).is_transient());
	}

	#[test]
	fn rejected_error_renders_reason() {
		let err = Error::Rejected { code: Some(40003), reason: "invalid openid".into() };

		assert_eq!(err.to_string(), "Provider rejected the request: invalid openid.");
	}
}
