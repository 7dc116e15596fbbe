//! Provider descriptor data structures and the built-in WeChat presets.
//!
//! The module exposes validated metadata, supporting builder utilities, and grant helpers so
//! providers can describe their capabilities in a transport-agnostic way.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Grant helpers wired into provider descriptors.
pub mod grant;
/// Provider-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use grant::*;
pub use quirks::*;

// self
use crate::{
	_prelude::*,
	auth::{ProviderId, SNSAPI_LOGIN, SNSAPI_USERINFO, ScopeSet},
};

const WECHAT_QRCONNECT_URL: &str = "https://open.weixin.qq.com/connect/qrconnect";
const WECHAT_OAUTH2_AUTHORIZE_URL: &str = "https://open.weixin.qq.com/connect/oauth2/authorize";
const WECHAT_TOKEN_URL: &str = "https://api.weixin.qq.com/sns/oauth2/access_token";
const WECHAT_REFRESH_URL: &str = "https://api.weixin.qq.com/sns/oauth2/refresh_token";
const WECHAT_USER_INFO_URL: &str = "https://api.weixin.qq.com/sns/userinfo";
const WECHAT_VERIFY_URL: &str = "https://api.weixin.qq.com/sns/auth";

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint end users are redirected to.
	pub authorization: Url,
	/// Endpoint exchanging authorization codes for access tokens.
	pub token: Url,
	/// Endpoint refreshing access tokens.
	pub refresh: Url,
	/// Endpoint returning the user profile.
	pub user_info: Url,
	/// Endpoint checking whether an access token is still valid.
	pub verify: Url,
}

/// Immutable provider descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor identifier.
	pub id: ProviderId,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Supported grant flags.
	pub supported_grants: SupportedGrants,
	/// Scope requested when the caller does not pick one.
	pub default_scope: ScopeSet,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}

	/// WeChat website application login (QR code scanned in the WeChat app).
	pub fn wechat() -> Result<Self, ProviderDescriptorError> {
		wechat_preset("wechat", WECHAT_QRCONNECT_URL, SNSAPI_LOGIN)
	}

	/// WeChat official-account login for pages opened inside the WeChat browser.
	pub fn wechat_official_account() -> Result<Self, ProviderDescriptorError> {
		wechat_preset("wechat-official-account", WECHAT_OAUTH2_AUTHORIZE_URL, SNSAPI_USERINFO)
	}

	/// Checks whether the descriptor supports a given grant.
	pub fn supports(&self, grant: GrantType) -> bool {
		self.supported_grants.supports(grant)
	}

	/// Returns a builder seeded with this descriptor's values.
	pub fn to_builder(&self) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder {
			id: self.id.clone(),
			authorization_endpoint: Some(self.endpoints.authorization.clone()),
			token_endpoint: Some(self.endpoints.token.clone()),
			refresh_endpoint: Some(self.endpoints.refresh.clone()),
			user_info_endpoint: Some(self.endpoints.user_info.clone()),
			verify_endpoint: Some(self.endpoints.verify.clone()),
			supported_grants: self.supported_grants,
			default_scope: self.default_scope.clone(),
			quirks: self.quirks.clone(),
		}
	}
}

fn wechat_preset(
	id: &str,
	authorization: &str,
	scope: &str,
) -> Result<ProviderDescriptor, ProviderDescriptorError> {
	let id = ProviderId::new(id).map_err(ProviderDescriptorError::InvalidId)?;
	let default_scope = ScopeSet::new([scope]).map_err(ProviderDescriptorError::InvalidScope)?;

	ProviderDescriptor::builder(id)
		.authorization_endpoint(parse_preset(authorization)?)
		.token_endpoint(parse_preset(WECHAT_TOKEN_URL)?)
		.refresh_endpoint(parse_preset(WECHAT_REFRESH_URL)?)
		.user_info_endpoint(parse_preset(WECHAT_USER_INFO_URL)?)
		.verify_endpoint(parse_preset(WECHAT_VERIFY_URL)?)
		.support_grants([GrantType::AuthorizationCode, GrantType::RefreshToken])
		.default_scope(default_scope)
		.quirks(ProviderQuirks::wechat())
		.build()
}

fn parse_preset(url: &str) -> Result<Url, ProviderDescriptorError> {
	Url::parse(url).map_err(|source| ProviderDescriptorError::InvalidUrl { url: url.into(), source })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn wechat_presets_share_api_endpoints() {
		let website = ProviderDescriptor::wechat().expect("Website preset should build.");
		let official = ProviderDescriptor::wechat_official_account()
			.expect("Official-account preset should build.");

		assert_eq!(website.endpoints.authorization.as_str(), WECHAT_QRCONNECT_URL);
		assert_eq!(official.endpoints.authorization.as_str(), WECHAT_OAUTH2_AUTHORIZE_URL);
		assert_eq!(website.endpoints.token, official.endpoints.token);
		assert_eq!(website.endpoints.refresh.as_str(), WECHAT_REFRESH_URL);
		assert!(website.default_scope.contains(SNSAPI_LOGIN));
		assert!(official.default_scope.contains(SNSAPI_USERINFO));
		assert!(website.supports(GrantType::RefreshToken));
		assert_eq!(website.quirks, ProviderQuirks::wechat());
	}

	#[test]
	fn to_builder_round_trips() {
		let descriptor = ProviderDescriptor::wechat().expect("Website preset should build.");
		let rebuilt = descriptor.to_builder().build().expect("Round trip should validate.");

		assert_eq!(rebuilt, descriptor);
	}
}
