#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use thegrid_strategy::{
	_preludet::*,
	config::StrategyConfig,
	oauth::TokenSet,
	profile::{Email, Profile},
	strategy::{ReqwestStrategy, VerifyFuture, VerifyUser},
};

const PROFILE_DOC: &str = r#"{"uuid":"u-1","name":"Ada Lovelace","email":"ada@example.com"}"#;

struct NoopVerify;
impl VerifyUser for NoopVerify {
	type User = ();

	fn verify<'a>(
		&'a self,
		_tokens: &'a TokenSet,
		_profile: Profile,
	) -> VerifyFuture<'a, Self::User> {
		Box::pin(async { Ok(()) })
	}
}

fn build_config(server: &MockServer) -> StrategyConfig {
	StrategyConfig::builder(
		"client-it",
		"secret-it",
		Url::parse("https://app.example.com/auth/thegrid/callback")
			.expect("Callback URL fixture should parse successfully."),
	)
	.profile_url(
		Url::parse(&server.url("/api/user"))
			.expect("Mock profile endpoint URL should parse successfully."),
	)
	.build()
	.expect("Configuration should build against the mock server.")
}

fn build_strategy(config: StrategyConfig) -> ReqwestStrategy<NoopVerify> {
	build_reqwest_test_strategy(config, NoopVerify)
}

#[tokio::test]
async fn fetch_maps_the_document_and_retains_the_raw_body() {
	let server = MockServer::start_async().await;
	let strategy = build_strategy(build_config(&server));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/user")
				.header("authorization", "Bearer tok123")
				.header("user-agent", "passport-thegrid");
			then.status(200).header("content-type", "application/json").body(PROFILE_DOC);
		})
		.await;
	let profile = strategy
		.user_profile("tok123")
		.await
		.expect("Profile fetch should succeed against the mock endpoint.");

	mock.assert_async().await;

	assert_eq!(profile.provider, "thegrid");
	assert_eq!(profile.id.as_deref(), Some("u-1"));
	assert_eq!(profile.display_name.as_deref(), Some("Ada Lovelace"));
	assert_eq!(profile.emails, vec![Email { value: "ada@example.com".into() }]);
	assert_eq!(profile.raw, PROFILE_DOC);
	assert_eq!(profile.json["uuid"], "u-1");
}

#[tokio::test]
async fn custom_user_agent_option_is_sent_on_the_wire() {
	let server = MockServer::start_async().await;
	let config = StrategyConfig::builder(
		"client-it",
		"secret-it",
		Url::parse("https://app.example.com/auth/thegrid/callback")
			.expect("Callback URL fixture should parse successfully."),
	)
	.profile_url(
		Url::parse(&server.url("/api/user"))
			.expect("Mock profile endpoint URL should parse successfully."),
	)
	.user_agent("myapp.com")
	.build()
	.expect("Configuration should build with a custom user agent.");
	let strategy = build_strategy(config);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user").header("user-agent", "myapp.com");
			then.status(200).header("content-type", "application/json").body(PROFILE_DOC);
		})
		.await;
	let profile = strategy
		.user_profile("tok123")
		.await
		.expect("Profile fetch should succeed with a custom user agent.");

	mock.assert_async().await;

	assert_eq!(profile.id.as_deref(), Some("u-1"));
}

#[tokio::test]
async fn overridden_profile_urls_are_respected() {
	let server = MockServer::start_async().await;
	let config = StrategyConfig::builder(
		"client-it",
		"secret-it",
		Url::parse("https://app.example.com/auth/thegrid/callback")
			.expect("Callback URL fixture should parse successfully."),
	)
	.profile_url(
		Url::parse(&server.url("/custom/user"))
			.expect("Custom profile endpoint URL should parse successfully."),
	)
	.build()
	.expect("Configuration should build with a custom profile endpoint.");
	let strategy = build_strategy(config);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/custom/user");
			then.status(200).header("content-type", "application/json").body(PROFILE_DOC);
		})
		.await;

	strategy
		.user_profile("tok123")
		.await
		.expect("Profile fetch should hit the overridden endpoint.");

	mock.assert_async().await;
}

#[tokio::test]
async fn malformed_bodies_surface_parse_errors_without_a_profile() {
	let server = MockServer::start_async().await;
	let strategy = build_strategy(build_config(&server));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user");
			then.status(200).header("content-type", "text/plain").body("not-json");
		})
		.await;
	let err = strategy
		.user_profile("tok123")
		.await
		.expect_err("Non-JSON bodies should fail the fetch totally.");

	mock.assert_async().await;

	assert!(matches!(err, Error::ProfileParse { .. }));
}

#[tokio::test]
async fn non_success_statuses_surface_fetch_errors() {
	let server = MockServer::start_async().await;
	let strategy = build_strategy(build_config(&server));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user");
			then.status(500).body("upstream exploded");
		})
		.await;
	let err = strategy
		.user_profile("tok123")
		.await
		.expect_err("Server errors should fail the fetch.");

	mock.assert_async().await;

	assert_eq!(err.to_string(), "Failed to fetch user profile.");
	assert!(matches!(err, Error::ProfileFetch { status: Some(500), .. }));
}

#[tokio::test]
async fn repeated_fetches_are_independent_requests() {
	let server = MockServer::start_async().await;
	let strategy = build_strategy(build_config(&server));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user");
			then.status(200).header("content-type", "application/json").body(PROFILE_DOC);
		})
		.await;
	let first = strategy.user_profile("tok123").await.expect("First fetch should succeed.");
	let second = strategy.user_profile("tok123").await.expect("Second fetch should succeed.");

	mock.assert_hits_async(2).await;

	assert_eq!(first.id, second.id);
	assert_eq!(first.raw, second.raw);
}
