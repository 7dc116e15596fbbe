// std
use std::{iter::IntoIterator, net::IpAddr};
// self
use crate::{
	_prelude::*,
	auth::{IdentifierError, ProviderId, ScopeSet, ScopeValidationError},
	provider::{GrantType, ProviderDescriptor, ProviderEndpoints, ProviderQuirks, SupportedGrants},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ProviderDescriptorError {
	/// Descriptor identifier failed validation.
	#[error("Descriptor identifier is invalid.")]
	InvalidId(#[source] IdentifierError),
	/// Default scope failed validation.
	#[error("Default scope is invalid.")]
	InvalidScope(#[source] ScopeValidationError),
	/// A preset or override URL cannot be parsed.
	#[error("Endpoint URL `{url}` cannot be parsed.")]
	InvalidUrl {
		/// Raw URL that failed parsing.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A required endpoint was never set.
	#[error("Missing {endpoint} endpoint.")]
	MissingEndpoint {
		/// Which endpoint is missing.
		endpoint: &'static str,
	},
	/// Every flow starts from an authorization code, so the grant must be enabled.
	#[error("Descriptor must enable the authorization_code grant.")]
	AuthorizationCodeDisabled,
	/// Endpoints must use HTTPS unless they point at a loopback host.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Reject scope delimiters that are control characters.
	#[error("Scope delimiter must be a printable character.")]
	InvalidScopeDelimiter {
		/// Invalid delimiter that was supplied.
		delimiter: char,
	},
	/// Request parameter names cannot be blank.
	#[error("The {quirk} parameter name cannot be empty.")]
	EmptyParameterName {
		/// Which quirk carried the blank name.
		quirk: &'static str,
	},
	/// Authorize fragments are stored without `#` and cannot be blank.
	#[error("Authorize fragment `{fragment}` must be non-empty and omit the leading `#`.")]
	InvalidAuthorizeFragment {
		/// Fragment that failed validation.
		fragment: String,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: ProviderId,
	/// Authorization endpoint end users are redirected to.
	pub authorization_endpoint: Option<Url>,
	/// Code exchange endpoint.
	pub token_endpoint: Option<Url>,
	/// Token refresh endpoint.
	pub refresh_endpoint: Option<Url>,
	/// User profile endpoint.
	pub user_info_endpoint: Option<Url>,
	/// Token verification endpoint.
	pub verify_endpoint: Option<Url>,
	/// Grants enabled for the provider.
	pub supported_grants: SupportedGrants,
	/// Scope requested when the caller does not pick one.
	pub default_scope: ScopeSet,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: ProviderId) -> Self {
		Self {
			id,
			authorization_endpoint: None,
			token_endpoint: None,
			refresh_endpoint: None,
			user_info_endpoint: None,
			verify_endpoint: None,
			supported_grants: SupportedGrants::default(),
			default_scope: ScopeSet::default(),
			quirks: ProviderQuirks::default(),
		}
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the code exchange endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the refresh endpoint.
	pub fn refresh_endpoint(mut self, url: Url) -> Self {
		self.refresh_endpoint = Some(url);

		self
	}

	/// Sets the user profile endpoint.
	pub fn user_info_endpoint(mut self, url: Url) -> Self {
		self.user_info_endpoint = Some(url);

		self
	}

	/// Sets the token verification endpoint.
	pub fn verify_endpoint(mut self, url: Url) -> Self {
		self.verify_endpoint = Some(url);

		self
	}

	/// Marks a single grant type as supported.
	pub fn support_grant(mut self, grant: GrantType) -> Self {
		self.supported_grants = self.supported_grants.enable(grant);

		self
	}

	/// Marks multiple grants as supported.
	pub fn support_grants<I>(mut self, grants: I) -> Self
	where
		I: IntoIterator<Item = GrantType>,
	{
		for grant in grants.into_iter() {
			self.supported_grants = self.supported_grants.enable(grant);
		}

		self
	}

	/// Overrides the default scope.
	pub fn default_scope(mut self, scope: ScopeSet) -> Self {
		self.default_scope = scope;

		self
	}

	/// Overrides the provider quirks.
	pub fn quirks(mut self, quirks: ProviderQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let endpoints = ProviderEndpoints {
			authorization: require("authorization", self.authorization_endpoint)?,
			token: require("token", self.token_endpoint)?,
			refresh: require("refresh", self.refresh_endpoint)?,
			user_info: require("user_info", self.user_info_endpoint)?,
			verify: require("verify", self.verify_endpoint)?,
		};
		let descriptor = ProviderDescriptor {
			id: self.id,
			endpoints,
			supported_grants: self.supported_grants,
			default_scope: self.default_scope,
			quirks: self.quirks,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		if !self.supports(GrantType::AuthorizationCode) {
			return Err(ProviderDescriptorError::AuthorizationCodeDisabled);
		}

		validate_endpoint("authorization", &self.endpoints.authorization)?;
		validate_endpoint("token", &self.endpoints.token)?;
		validate_endpoint("refresh", &self.endpoints.refresh)?;
		validate_endpoint("user_info", &self.endpoints.user_info)?;
		validate_endpoint("verify", &self.endpoints.verify)?;
		validate_quirks(&self.quirks)?;

		Ok(())
	}
}

fn require(endpoint: &'static str, url: Option<Url>) -> Result<Url, ProviderDescriptorError> {
	url.ok_or(ProviderDescriptorError::MissingEndpoint { endpoint })
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderDescriptorError> {
	match url.scheme() {
		"https" => Ok(()),
		"http" if is_loopback(url) => Ok(()),
		_ => Err(ProviderDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() }),
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host_str() {
		Some("localhost") => true,
		Some(host) => host
			.trim_start_matches('[')
			.trim_end_matches(']')
			.parse::<IpAddr>()
			.map(|ip| ip.is_loopback())
			.unwrap_or(false),
		None => false,
	}
}

fn validate_quirks(quirks: &ProviderQuirks) -> Result<(), ProviderDescriptorError> {
	if quirks.scope_delimiter.is_control() {
		return Err(ProviderDescriptorError::InvalidScopeDelimiter {
			delimiter: quirks.scope_delimiter,
		});
	}
	if quirks.client_id_param.trim().is_empty() {
		return Err(ProviderDescriptorError::EmptyParameterName { quirk: "client_id_param" });
	}
	if quirks.client_secret_param.trim().is_empty() {
		return Err(ProviderDescriptorError::EmptyParameterName { quirk: "client_secret_param" });
	}
	if let Some(fragment) = quirks
		.authorize_fragment
		.as_deref()
		.filter(|fragment| fragment.is_empty() || fragment.starts_with('#'))
	{
		return Err(ProviderDescriptorError::InvalidAuthorizeFragment { fragment: fragment.into() });
	}

	Ok(())
}
