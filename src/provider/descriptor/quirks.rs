// self
use crate::_prelude::*;

/// Provider-specific quirks that shape request parameters and authorize URLs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// Character used to join scopes in requests and to split them in responses.
	pub scope_delimiter: char,
	/// Literal fragment appended to authorize URLs (without the leading `#`).
	pub authorize_fragment: Option<String>,
	/// Query parameter carrying the client identifier.
	pub client_id_param: String,
	/// Query parameter carrying the client secret.
	pub client_secret_param: String,
}
impl ProviderQuirks {
	/// WeChat conventions: `appid`/`secret`, comma-joined scopes, `#wechat_redirect`.
	pub fn wechat() -> Self {
		Self {
			scope_delimiter: ',',
			authorize_fragment: Some("wechat_redirect".into()),
			client_id_param: "appid".into(),
			client_secret_param: "secret".into(),
		}
	}
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self {
			scope_delimiter: ' ',
			authorize_fragment: None,
			client_id_param: "client_id".into(),
			client_secret_param: "client_secret".into(),
		}
	}
}
