//! Optional observability helpers for WeChat flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth2_wechat.flow` with the `flow` and
//!   `stage` (call site) fields, plus a `warn` event whenever WeChat rejects a call.
//! - Enable `metrics` to increment the `oauth2_wechat_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Flow kinds observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Authorize URL construction.
	Authorize,
	/// Authorization code exchange.
	CodeExchange,
	/// Refresh token flow.
	Refresh,
	/// User profile lookup.
	UserInfo,
	/// Access token verification.
	VerifyToken,
	/// Callback handling (exchange plus profile).
	Authenticate,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Authorize => "authorize",
			FlowKind::CodeExchange => "code_exchange",
			FlowKind::Refresh => "refresh",
			FlowKind::UserInfo => "user_info",
			FlowKind::VerifyToken => "verify_token",
			FlowKind::Authenticate => "authenticate",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
