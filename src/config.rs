//! Caller-supplied client options layered over the built-in provider descriptors.
//!
//! [`ClientOptions`] is the configuration record an application keeps in its settings file or
//! environment. Options merge left to right ([`ClientOptions::merge`]) and then rewrite a
//! [`ProviderDescriptor`] ([`ClientOptions::apply`]) so endpoint overrides go through the same
//! validation as the presets.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, Secret},
	error::ConfigError,
	provider::ProviderDescriptor,
};

/// Options that configure an [`OAuthClient`](crate::flows::OAuthClient).
///
/// Every field is optional; unset fields fall back to the descriptor defaults or to an earlier
/// layer in a [`merge`](Self::merge) chain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientOptions {
	/// App identifier (`appid`).
	pub client_id: Option<String>,
	/// App secret.
	pub client_secret: Option<Secret>,
	/// Callback URL registered with WeChat.
	pub redirect_uri: Option<Url>,
	/// Scope requested when an authorize request does not name one.
	pub scope: Option<ScopeSet>,
	/// Base URL the API endpoints are rebased onto (paths are preserved).
	pub site: Option<Url>,
	/// Authorization endpoint override.
	pub authorize_url: Option<Url>,
	/// Code exchange endpoint override.
	pub token_url: Option<Url>,
	/// Refresh endpoint override.
	pub refresh_url: Option<Url>,
	/// User profile endpoint override.
	pub user_info_url: Option<Url>,
	/// Token verification endpoint override.
	pub verify_url: Option<Url>,
	/// Language for user profiles (`zh_CN`, `zh_TW`, `en`).
	pub lang: Option<String>,
}
impl ClientOptions {
	/// Layers `overrides` on top of `self`; every field set in `overrides` wins.
	pub fn merge(self, overrides: Self) -> Self {
		Self {
			client_id: overrides.client_id.or(self.client_id),
			client_secret: overrides.client_secret.or(self.client_secret),
			redirect_uri: overrides.redirect_uri.or(self.redirect_uri),
			scope: overrides.scope.or(self.scope),
			site: overrides.site.or(self.site),
			authorize_url: overrides.authorize_url.or(self.authorize_url),
			token_url: overrides.token_url.or(self.token_url),
			refresh_url: overrides.refresh_url.or(self.refresh_url),
			user_info_url: overrides.user_info_url.or(self.user_info_url),
			verify_url: overrides.verify_url.or(self.verify_url),
			lang: overrides.lang.or(self.lang),
		}
	}

	/// Rewrites `descriptor` with the endpoint and scope overrides and re-validates it.
	///
	/// `site` rebases the token, refresh, user-info, and verify endpoints while keeping their
	/// paths. Explicit endpoint URLs win over rebased ones. The authorize endpoint lives on a
	/// different host and only changes through `authorize_url`.
	pub fn apply(&self, descriptor: ProviderDescriptor) -> Result<ProviderDescriptor, ConfigError> {
		let mut builder = descriptor.to_builder();

		if let Some(site) = self.site.as_ref() {
			builder.token_endpoint = builder.token_endpoint.map(|url| rebase(site, &url));
			builder.refresh_endpoint = builder.refresh_endpoint.map(|url| rebase(site, &url));
			builder.user_info_endpoint = builder.user_info_endpoint.map(|url| rebase(site, &url));
			builder.verify_endpoint = builder.verify_endpoint.map(|url| rebase(site, &url));
		}
		if let Some(url) = self.authorize_url.clone() {
			builder = builder.authorization_endpoint(url);
		}
		if let Some(url) = self.token_url.clone() {
			builder = builder.token_endpoint(url);
		}
		if let Some(url) = self.refresh_url.clone() {
			builder = builder.refresh_endpoint(url);
		}
		if let Some(url) = self.user_info_url.clone() {
			builder = builder.user_info_endpoint(url);
		}
		if let Some(url) = self.verify_url.clone() {
			builder = builder.verify_endpoint(url);
		}
		if let Some(scope) = self.scope.clone() {
			builder = builder.default_scope(scope);
		}

		Ok(builder.build()?)
	}

	/// Reads options from the process environment.
	///
	/// See [`from_lookup`](Self::from_lookup) for the recognized variables.
	pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
		Self::from_lookup(prefix, |key| std::env::var(key).ok())
	}

	/// Reads options through `lookup`, using keys `{prefix}_APPID`, `{prefix}_SECRET`,
	/// `{prefix}_REDIRECT_URI`, `{prefix}_SCOPE` (comma separated), and `{prefix}_SITE`.
	///
	/// Blank values count as unset.
	pub fn from_lookup<F>(prefix: &str, lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let read = |suffix: &str| {
			let key = format!("{prefix}_{suffix}");
			let value = lookup(&key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

			(key, value)
		};
		let parse_url = |suffix: &str| -> Result<Option<Url>, ConfigError> {
			match read(suffix) {
				(key, Some(raw)) =>
					Url::parse(&raw).map(Some).map_err(|e| ConfigError::invalid_url(key, e)),
				(_, None) => Ok(None),
			}
		};
		let scope = match read("SCOPE").1 {
			Some(raw) => Some(ScopeSet::parse_delimited(&raw, ',')?),
			None => None,
		};

		Ok(Self {
			client_id: read("APPID").1,
			client_secret: read("SECRET").1.map(Secret::from),
			redirect_uri: parse_url("REDIRECT_URI")?,
			scope,
			site: parse_url("SITE")?,
			..Default::default()
		})
	}
}

fn rebase(site: &Url, endpoint: &Url) -> Url {
	let mut url = site.clone();
	let path = format!("{}{}", site.path().trim_end_matches('/'), endpoint.path());

	url.set_path(&path);
	url.set_query(endpoint.query());

	url
}
