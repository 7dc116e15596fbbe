//! Walks through a WeChat website login against a local mock of the WeChat API: build the QR
//! connect URL, handle the callback `code`, then refresh the resulting token.
//!
//! `WECHAT_APPID`, `WECHAT_SECRET`, `WECHAT_REDIRECT_URI`, and `WECHAT_SCOPE` override the demo
//! credentials when set.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use oauth2_wechat::{config::ClientOptions, flows::{AuthorizeRequest, ReqwestOAuthClient}};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/sns/oauth2/access_token").query_param("code", "demo-code");
			then.status(200).header("content-type", "text/plain").body(
				"{\"access_token\":\"demo-access\",\"expires_in\":7200,\
				\"refresh_token\":\"demo-refresh\",\"openid\":\"demo-openid\",\
				\"scope\":\"snsapi_login\",\"unionid\":\"demo-unionid\"}",
			);
		})
		.await;
	let user_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/sns/userinfo").query_param("openid", "demo-openid");
			then.status(200).header("content-type", "text/plain").body(
				"{\"openid\":\"demo-openid\",\"nickname\":\"Demo User\",\"sex\":0,\
				\"province\":\"Zhejiang\",\"city\":\"Hangzhou\",\"country\":\"CN\",\
				\"headimgurl\":\"\",\"privilege\":[],\"unionid\":\"demo-unionid\"}",
			);
		})
		.await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/sns/oauth2/refresh_token")
				.query_param("refresh_token", "demo-refresh");
			then.status(200)
				.header("content-type", "text/plain")
				.body("{\"access_token\":\"demo-access-2\",\"expires_in\":7200}");
		})
		.await;
	let defaults = ClientOptions {
		client_id: Some("wx-demo-appid".into()),
		client_secret: Some("demo-secret".into()),
		redirect_uri: Some(Url::parse("https://app.example.com/auth/wechat/callback")?),
		lang: Some("en".into()),
		..Default::default()
	};
	let mock_site =
		ClientOptions { site: Some(Url::parse(&server.base_url())?), ..Default::default() };
	let options = defaults.merge(ClientOptions::from_env("WECHAT")?).merge(mock_site);
	let client = ReqwestOAuthClient::wechat(&options)?;
	let authorize_url = client.authorize_url(AuthorizeRequest::new().with_state("demo-state"))?;

	println!("Send the browser to: {authorize_url}");

	let auth = client.authenticate("demo-code").await?;
	let location = auth.user.as_ref().and_then(|user| user.location()).unwrap_or_default();

	println!("Signed in openid {} from {location}.", auth.uid);

	let refreshed = client.refresh(&auth.token).await?;

	println!(
		"Refreshed access token: {} (refresh token kept: {}).",
		refreshed.access_token.expose(),
		refreshed.refresh_token.is_some()
	);

	token_mock.assert_async().await;
	user_mock.assert_async().await;
	refresh_mock.assert_async().await;

	Ok(())
}
