//! Provider strategy hooks that customize API calls.
//!
//! Implementations decorate outgoing token requests and normalize error mapping
//! without tying flows to any particular HTTP client.

// self
use crate::{_prelude::*, provider::descriptor::GrantType};

/// Strategy hook that allows providers to decorate requests and classify errors.
///
/// Implementors are required to be `Send + Sync`, and the hooks use crate-owned data types so
/// downstream crates never depend on reqwest-specific structures. `augment_token_request` has a
/// default no-op implementation.
pub trait ProviderStrategy: Send + Sync {
	/// Maps a failed provider call into the crate error taxonomy.
	fn classify_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind;

	/// Gives providers a chance to add query parameters before a token request is dispatched.
	///
	/// The method works on a plain `BTreeMap` so implementations remain HTTP client agnostic.
	/// Keys already present are overwritten.
	fn augment_token_request(&self, _grant: GrantType, _query: &mut BTreeMap<String, String>) {}
}

/// Provider API call that produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderCall {
	/// Token endpoint call for the given grant.
	Token(GrantType),
	/// User profile lookup.
	UserInfo,
	/// Access token verification.
	VerifyToken,
}
impl ProviderCall {
	/// Stable label used in logs and error messages.
	pub fn as_str(self) -> &'static str {
		match self {
			ProviderCall::Token(GrantType::AuthorizationCode) => "code_exchange",
			ProviderCall::Token(GrantType::RefreshToken) => "refresh",
			ProviderCall::UserInfo => "user_info",
			ProviderCall::VerifyToken => "verify_token",
		}
	}
}
impl Display for ProviderCall {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Canonical provider error categories used by strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderErrorKind {
	/// Provider rejected the authorization grant (bad code or refresh token).
	InvalidGrant,
	/// Client authentication failed.
	InvalidClient,
	/// The token does not cover the requested API.
	InsufficientScope,
	/// Failure is temporary and should be retried.
	Transient,
	/// Any other provider rejection.
	Rejected,
}

/// Context passed to provider strategies when classifying errors.
///
/// The struct keeps only primitive data (status codes, provider fields, body preview) so
/// strategies stay decoupled from any HTTP client. Flows populate the context before invoking
/// [`ProviderStrategy::classify_error`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderErrorContext {
	/// Call associated with the failing request.
	pub call: ProviderCall,
	/// HTTP status code returned by the provider, when available.
	pub http_status: Option<u16>,
	/// Provider-supplied numeric `errcode`.
	pub error_code: Option<i64>,
	/// Provider-supplied `errmsg`.
	pub error_message: Option<String>,
	/// Preview of the response body for payloads without structured fields.
	pub body_preview: Option<String>,
	/// Indicates whether the failure originated from the network/transport layer.
	pub network_error: bool,
}
impl ProviderErrorContext {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Creates a new context scoped to the provided call.
	pub fn new(call: ProviderCall) -> Self {
		Self {
			call,
			http_status: None,
			error_code: None,
			error_message: None,
			body_preview: None,
			network_error: false,
		}
	}

	/// Convenience constructor for transport-level/network failures.
	pub fn network_failure(call: ProviderCall) -> Self {
		Self::new(call).with_network_error(true)
	}

	/// Overrides the network error flag.
	pub fn with_network_error(mut self, network_error: bool) -> Self {
		self.network_error = network_error;

		self
	}

	/// Adds an HTTP status code.
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Adds the provider `errcode`.
	pub fn with_error_code(mut self, code: i64) -> Self {
		self.error_code = Some(code);

		self
	}

	/// Adds the provider `errmsg`.
	pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
		self.error_message = Some(message.into());

		self
	}

	/// Adds a body preview, truncated to a bounded number of characters.
	pub fn with_body_preview(mut self, body: impl Into<String>) -> Self {
		self.body_preview = Some(truncate_preview(body.into()));

		self
	}

	/// Best available human-readable reason for the failure.
	pub fn reason(&self) -> String {
		if let Some(message) = self.error_message.as_deref().filter(|m| !m.is_empty()) {
			return message.to_owned();
		}
		if let Some(code) = self.error_code {
			return format!("errcode {code}");
		}
		if let Some(preview) = self.body_preview.as_deref().filter(|b| !b.trim().is_empty()) {
			return preview.to_owned();
		}

		match self.http_status {
			Some(status) => format!("HTTP {status} from {}", self.call),
			None => format!("{} call failed", self.call),
		}
	}
}

/// Strategy that understands WeChat's numeric `errcode` catalogue.
///
/// Network failures are always transient. Known error codes are matched first, then the HTTP
/// status code decides; WeChat usually answers errors with HTTP 200 so the status fallback mostly
/// applies to gateways and proxies in front of the API.
#[derive(Debug, Default)]
pub struct WechatStrategy;
impl Display for WechatStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("wechat-provider-strategy")
	}
}
impl ProviderStrategy for WechatStrategy {
	fn classify_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind {
		if ctx.network_error {
			return ProviderErrorKind::Transient;
		}
		if let Some(kind) = ctx.error_code.and_then(classify_errcode) {
			return kind;
		}

		classify_status(ctx.http_status)
	}
}

fn truncate_preview(body: String) -> String {
	if body.chars().count() <= ProviderErrorContext::BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf = String::new();

	for (idx, ch) in body.chars().enumerate() {
		if idx >= ProviderErrorContext::BODY_PREVIEW_LIMIT {
			buf.push('…');

			break;
		}
		buf.push(ch);
	}

	buf
}

fn classify_errcode(code: i64) -> Option<ProviderErrorKind> {
	match code {
		// System busy, API frequency or daily quota exceeded.
		-1 | 45009 | 45011 => Some(ProviderErrorKind::Transient),
		// Invalid, used, or expired code and tokens.
		40029 | 40030 | 40163 | 41008 | 42001 | 42002 | 42003 | 40014 =>
			Some(ProviderErrorKind::InvalidGrant),
		// Bad appid or secret.
		40001 | 40013 | 40125 | 40164 | 41002 | 41004 => Some(ProviderErrorKind::InvalidClient),
		// API unauthorized for this token or app.
		48001 | 50001 => Some(ProviderErrorKind::InsufficientScope),
		_ => None,
	}
}

fn classify_status(status: Option<u16>) -> ProviderErrorKind {
	match status {
		Some(429) => ProviderErrorKind::Transient,
		Some(code) if code >= 500 => ProviderErrorKind::Transient,
		Some(401) => ProviderErrorKind::InvalidClient,
		Some(403) => ProviderErrorKind::InsufficientScope,
		_ => ProviderErrorKind::Rejected,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const CODE: ProviderCall = ProviderCall::Token(GrantType::AuthorizationCode);

	fn classify(ctx: ProviderErrorContext) -> ProviderErrorKind {
		WechatStrategy.classify_error(&ctx)
	}

	#[test]
	fn network_failures_are_transient() {
		assert_eq!(classify(ProviderErrorContext::network_failure(CODE)), ProviderErrorKind::Transient);
	}

	#[test]
	fn errcodes_take_precedence_over_status() {
		let ctx = ProviderErrorContext::new(CODE).with_http_status(200).with_error_code(40029);

		assert_eq!(classify(ctx), ProviderErrorKind::InvalidGrant);
		assert_eq!(
			classify(ProviderErrorContext::new(ProviderCall::UserInfo).with_error_code(42001)),
			ProviderErrorKind::InvalidGrant
		);
		assert_eq!(
			classify(ProviderErrorContext::new(CODE).with_error_code(40125)),
			ProviderErrorKind::InvalidClient
		);
		assert_eq!(
			classify(ProviderErrorContext::new(ProviderCall::UserInfo).with_error_code(48001)),
			ProviderErrorKind::InsufficientScope
		);
		assert_eq!(
			classify(ProviderErrorContext::new(CODE).with_error_code(-1)),
			ProviderErrorKind::Transient
		);
	}

	#[test]
	fn unknown_errcodes_fall_back_to_status() {
		let ok = ProviderErrorContext::new(CODE).with_http_status(200).with_error_code(40003);
		let busy = ProviderErrorContext::new(CODE).with_http_status(503).with_error_code(99999);

		assert_eq!(classify(ok), ProviderErrorKind::Rejected);
		assert_eq!(classify(busy), ProviderErrorKind::Transient);
		assert_eq!(
			classify(ProviderErrorContext::new(CODE).with_http_status(429)),
			ProviderErrorKind::Transient
		);
		assert_eq!(
			classify(ProviderErrorContext::new(CODE).with_http_status(401)),
			ProviderErrorKind::InvalidClient
		);
		assert_eq!(
			classify(ProviderErrorContext::new(CODE).with_http_status(403)),
			ProviderErrorKind::InsufficientScope
		);
		assert_eq!(
			classify(ProviderErrorContext::new(CODE).with_http_status(404)),
			ProviderErrorKind::Rejected
		);
	}

	#[test]
	fn body_preview_is_truncated() {
		let ctx = ProviderErrorContext::new(CODE).with_body_preview("x".repeat(300));
		let preview = ctx.body_preview.expect("Preview should be recorded.");

		assert_eq!(preview.chars().count(), ProviderErrorContext::BODY_PREVIEW_LIMIT + 1);
		assert!(preview.ends_with('…'));
	}

	#[test]
	fn reason_prefers_provider_message() {
		let ctx = ProviderErrorContext::new(CODE)
			.with_error_code(40029)
			.with_error_message("invalid code");

		assert_eq!(ctx.reason(), "invalid code");
		assert_eq!(ProviderErrorContext::new(CODE).with_error_code(40029).reason(), "errcode 40029");
		assert_eq!(
			ProviderErrorContext::new(ProviderCall::VerifyToken).with_http_status(502).reason(),
			"HTTP 502 from verify_token"
		);
	}
}
