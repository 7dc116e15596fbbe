//! WeChat OAuth 2.0 strategy built on the `oauth2` transport stack.
//!
//! The crate builds WeChat authorize URLs, exchanges authorization codes, refreshes tokens, and
//! resolves user profiles into a normalized access-token shape for authentication pipelines.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::ClientOptions,
		flows::OAuthClient,
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		provider::{ProviderDescriptor, ProviderStrategy, WechatStrategy},
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = OAuthClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// App identifier used across integration tests.
	pub const TEST_APPID: &str = "wx-test-appid";
	/// App secret used across integration tests.
	pub const TEST_SECRET: &str = "test-app-secret";

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Returns a WeChat website descriptor whose API endpoints point at the mock server `site`.
	pub fn mock_wechat_descriptor(site: &str) -> ProviderDescriptor {
		let options = ClientOptions {
			site: Some(Url::parse(site).expect("Mock site URL should parse.")),
			..Default::default()
		};

		options
			.apply(ProviderDescriptor::wechat().expect("WeChat preset should build."))
			.expect("Mock site should rebase the WeChat descriptor.")
	}

	/// Constructs an [`OAuthClient`] wired to the WeChat strategy and the test reqwest transport,
	/// with every API endpoint rebased onto the mock server `site`.
	pub fn build_reqwest_test_client(site: &str) -> ReqwestTestClient {
		let strategy: Arc<dyn ProviderStrategy> = Arc::new(WechatStrategy);

		OAuthClient::with_http_client(
			mock_wechat_descriptor(site),
			strategy,
			TEST_APPID,
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		)
		.with_client_secret(TEST_SECRET)
		.with_redirect_uri(
			Url::parse("https://app.example.com/auth/wechat/callback")
				.expect("Redirect URI fixture should parse."),
		)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value as JsonValue;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use oauth2;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
