// std
use std::collections::BTreeMap;
// self
use oauth2_wechat::{
	auth::{ProviderId, SNSAPI_BASE, SNSAPI_LOGIN, SNSAPI_USERINFO, ScopeSet},
	config::ClientOptions,
	provider::{
		GrantType, ProviderCall, ProviderDescriptor, ProviderDescriptorBuilder,
		ProviderDescriptorError, ProviderErrorContext, ProviderErrorKind, ProviderQuirks,
		ProviderStrategy, WechatStrategy,
	},
	url::Url,
};

fn url(value: &str) -> Url {
	Url::parse(value).expect("Failed to parse mock provider URL.")
}

fn builder(id: &str) -> ProviderDescriptorBuilder {
	let provider_id =
		ProviderId::new(id).expect("Failed to build provider identifier for mock descriptor.");

	ProviderDescriptor::builder(provider_id)
		.authorization_endpoint(url("https://open.example.com/connect/qrconnect"))
		.token_endpoint(url("https://api.example.com/sns/oauth2/access_token"))
		.refresh_endpoint(url("https://api.example.com/sns/oauth2/refresh_token"))
		.user_info_endpoint(url("https://api.example.com/sns/userinfo"))
		.verify_endpoint(url("https://api.example.com/sns/auth"))
}

#[test]
fn descriptor_rejects_insecure_endpoints_and_missing_grants() {
	let err = builder("mock-grants")
		.support_grant(GrantType::RefreshToken)
		.build()
		.expect_err("Descriptor builder should require the authorization code grant.");

	assert_eq!(err, ProviderDescriptorError::AuthorizationCodeDisabled);

	let err = builder("mock-insecure")
		.token_endpoint(url("http://api.example.com/sns/oauth2/access_token"))
		.support_grant(GrantType::AuthorizationCode)
		.build()
		.expect_err("Descriptor builder should reject insecure token endpoints.");

	assert!(matches!(err, ProviderDescriptorError::InsecureEndpoint { endpoint: "token", .. }));

	let descriptor = builder("mock-loopback")
		.token_endpoint(url("http://127.0.0.1:8080/sns/oauth2/access_token"))
		.support_grant(GrantType::AuthorizationCode)
		.build()
		.expect("Loopback endpoints may use plain HTTP.");

	assert_eq!(descriptor.endpoints.token.scheme(), "http");
}

#[test]
fn descriptor_support_helpers_cover_flags() {
	let scope = ScopeSet::new([SNSAPI_USERINFO]).expect("Scope fixture should be valid.");
	let descriptor = builder("grants")
		.support_grants([GrantType::AuthorizationCode, GrantType::RefreshToken])
		.default_scope(scope)
		.quirks(ProviderQuirks::wechat())
		.build()
		.expect("Descriptor builder should succeed for secure endpoints.");

	assert!(descriptor.supports(GrantType::AuthorizationCode));
	assert!(descriptor.supports(GrantType::RefreshToken));
	assert_eq!(descriptor.endpoints.verify.as_str(), "https://api.example.com/sns/auth");
	assert!(descriptor.default_scope.contains(SNSAPI_USERINFO));
	assert_eq!(descriptor.quirks.scope_delimiter, ',');
	assert_eq!(descriptor.quirks.authorize_fragment.as_deref(), Some("wechat_redirect"));
	assert_eq!(descriptor.quirks.client_id_param, "appid");
}

#[test]
fn quirks_reject_blank_names_and_prefixed_fragments() {
	let quirks = ProviderQuirks { client_id_param: " ".into(), ..ProviderQuirks::wechat() };
	let err = builder("blank-param")
		.support_grant(GrantType::AuthorizationCode)
		.quirks(quirks)
		.build()
		.expect_err("Blank parameter names should be rejected.");

	assert_eq!(err, ProviderDescriptorError::EmptyParameterName { quirk: "client_id_param" });

	let quirks =
		ProviderQuirks { authorize_fragment: Some("#wechat_redirect".into()), ..ProviderQuirks::wechat() };
	let err = builder("fragment")
		.support_grant(GrantType::AuthorizationCode)
		.quirks(quirks)
		.build()
		.expect_err("Fragments with a leading `#` should be rejected.");

	assert!(matches!(err, ProviderDescriptorError::InvalidAuthorizeFragment { .. }));
}

#[test]
fn presets_differ_only_in_authorize_endpoint_and_scope() {
	let website = ProviderDescriptor::wechat().expect("Website preset should build.");
	let official =
		ProviderDescriptor::wechat_official_account().expect("Official account preset should build.");

	assert_eq!(website.endpoints.authorization.path(), "/connect/qrconnect");
	assert_eq!(official.endpoints.authorization.path(), "/connect/oauth2/authorize");
	assert_eq!(website.endpoints.token, official.endpoints.token);
	assert!(website.default_scope.contains(SNSAPI_LOGIN));
	assert!(official.default_scope.contains(SNSAPI_USERINFO));
	assert_ne!(website.id, official.id);
}

#[test]
fn options_rebase_api_endpoints_onto_site() {
	let options = ClientOptions {
		site: Some(url("http://localhost:4010/mock")),
		scope: Some(ScopeSet::new([SNSAPI_BASE]).expect("Scope fixture should be valid.")),
		..Default::default()
	};
	let descriptor = options
		.apply(ProviderDescriptor::wechat_official_account().expect("Preset should build."))
		.expect("Rebased descriptor should validate.");

	assert_eq!(
		descriptor.endpoints.token.as_str(),
		"http://localhost:4010/mock/sns/oauth2/access_token"
	);
	assert_eq!(descriptor.endpoints.authorization.host_str(), Some("open.weixin.qq.com"));
	assert!(descriptor.default_scope.contains(SNSAPI_BASE));
	assert!(!descriptor.default_scope.grants_user_info());
}

#[test]
fn wechat_strategy_prefers_errcodes_over_status() {
	let strategy = WechatStrategy;
	let call = ProviderCall::Token(GrantType::AuthorizationCode);
	let ctx = ProviderErrorContext::new(call).with_http_status(200).with_error_code(40029);

	assert_eq!(strategy.classify_error(&ctx), ProviderErrorKind::InvalidGrant);

	let ctx = ProviderErrorContext::new(call).with_http_status(200).with_error_code(45011);

	assert_eq!(strategy.classify_error(&ctx), ProviderErrorKind::Transient);

	let ctx = ProviderErrorContext::new(call).with_http_status(200).with_error_code(99999);

	assert_eq!(strategy.classify_error(&ctx), ProviderErrorKind::Rejected);
}

#[test]
fn wechat_strategy_falls_back_to_status() {
	let strategy = WechatStrategy;
	let ctx = ProviderErrorContext::new(ProviderCall::UserInfo).with_http_status(401);

	assert_eq!(strategy.classify_error(&ctx), ProviderErrorKind::InvalidClient);

	let ctx = ProviderErrorContext::new(ProviderCall::UserInfo).with_http_status(502);

	assert_eq!(strategy.classify_error(&ctx), ProviderErrorKind::Transient);

	let network_ctx = ProviderErrorContext::network_failure(ProviderCall::VerifyToken);

	assert_eq!(strategy.classify_error(&network_ctx), ProviderErrorKind::Transient);
}

#[test]
fn custom_strategy_can_augment_token_requests() {
	struct ComponentStrategy;
	impl ProviderStrategy for ComponentStrategy {
		fn classify_error(&self, _ctx: &ProviderErrorContext) -> ProviderErrorKind {
			ProviderErrorKind::Rejected
		}

		fn augment_token_request(&self, grant: GrantType, query: &mut BTreeMap<String, String>) {
			query.insert("component_appid".into(), format!("for:{grant}"));
		}
	}

	let strategy = ComponentStrategy;
	let mut query = BTreeMap::new();

	query.insert("grant_type".into(), "refresh_token".into());
	strategy.augment_token_request(GrantType::RefreshToken, &mut query);

	assert_eq!(query.get("component_appid").map(String::as_str), Some("for:refresh_token"));
	assert_eq!(WechatStrategy.to_string(), "wechat-provider-strategy");
}
