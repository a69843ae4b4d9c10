//! The strategy front door: authorize URL construction, profile fetches, and
//! the full authenticate flow.
//!
//! A [`Strategy`] composes three collaborators rather than inheriting from any
//! of them: a resolved [`StrategyConfig`], an internal facade over the generic
//! `oauth2` client for the code exchange, and a [`StrategyHttpClient`]
//! transport shared by the exchange and the profile fetch. Each authentication
//! attempt is a single linear exchange with no shared mutable state, so one
//! strategy value safely serves concurrent logins.

// self
use crate::{
	_prelude::*,
	config::StrategyConfig,
	error::ProfileStatusError,
	http::{ProfileResponse, StrategyHttpClient},
	oauth::{ExchangeFacade, TokenSet},
	obs::{AuthStage, StageSpan},
	profile::Profile,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Strategy identifier exposed to host frameworks.
pub const STRATEGY_NAME: &str = "thegrid";

/// Error type applications may return from the verify hook.
pub type VerifyError = Box<dyn StdError + Send + Sync>;
/// Future type returned by [`VerifyUser::verify`].
pub type VerifyFuture<'a, U> = Pin<Box<dyn Future<Output = Result<U, VerifyError>> + 'a + Send>>;

/// Application-supplied verification hook.
///
/// Invoked exactly once per successful exchange-and-fetch with the issued
/// tokens and the normalized profile; the hook decides what user value the
/// host framework receives. The strategy forwards the hook's outcome without
/// inspecting it.
pub trait VerifyUser
where
	Self: Send + Sync,
{
	/// User type produced for the host framework.
	type User: 'static + Send;

	/// Maps the issued tokens and normalized profile into an application user.
	fn verify<'a>(&'a self, tokens: &'a TokenSet, profile: Profile) -> VerifyFuture<'a, Self::User>;
}

#[cfg(feature = "reqwest")]
/// Strategy specialized for the crate's default reqwest transport.
pub type ReqwestStrategy<V> = Strategy<ReqwestHttpClient, V>;

/// TheGrid OAuth 2.0 authentication strategy.
pub struct Strategy<C, V>
where
	C: ?Sized + StrategyHttpClient,
	V: ?Sized + VerifyUser,
{
	/// Resolved, immutable configuration.
	pub config: StrategyConfig,
	/// HTTP client used for every outbound provider request.
	pub http_client: Arc<C>,
	verify: Arc<V>,
	facade: ExchangeFacade,
}
impl<C, V> Strategy<C, V>
where
	C: ?Sized + StrategyHttpClient,
	V: ?Sized + VerifyUser,
{
	/// Creates a strategy that reuses the caller-provided transport.
	///
	/// The transport is expected to carry the configuration's resolved header
	/// set; [`ReqwestHttpClient::from_config`](crate::http::ReqwestHttpClient) does this for the default stack.
	pub fn with_http_client(
		config: StrategyConfig,
		http_client: impl Into<Arc<C>>,
		verify: impl Into<Arc<V>>,
	) -> Result<Self> {
		let facade = ExchangeFacade::from_config(&config)?;

		Ok(Self { config, http_client: http_client.into(), verify: verify.into(), facade })
	}

	/// Returns the identifier this strategy registers with host frameworks.
	pub const fn name(&self) -> &'static str {
		STRATEGY_NAME
	}

	/// Builds the provider authorize URL end-users should be redirected to.
	///
	/// `state` is the host framework's CSRF token; the strategy round-trips it
	/// verbatim. Requested scopes are joined with the configured separator.
	pub fn authorization_url(&self, state: &str) -> Url {
		let mut url = self.config.authorization_url.clone();
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("response_type", "code");
		pairs.append_pair("client_id", &self.config.client_id);
		pairs.append_pair("redirect_uri", self.config.callback_url.as_str());

		if let Some(scope_value) = self.config.scope_param() {
			pairs.append_pair("scope", &scope_value);
		}

		pairs.append_pair("state", state);

		drop(pairs);

		url
	}

	/// Retrieves and normalizes the user profile for an access token.
	///
	/// Exactly one outbound request per call; fetches are independent and
	/// stateless, and failures are reported once and never retried. Transport
	/// failures and non-2xx responses surface as [`Error::ProfileFetch`];
	/// bodies that are not valid JSON surface as [`Error::ProfileParse`].
	pub async fn user_profile(&self, access_token: &str) -> Result<Profile> {
		let span = StageSpan::new(AuthStage::Profile);
		let response = span
			.instrument(self.http_client.get_profile(&self.config.profile_url, access_token))
			.await
			.map_err(|source| Error::profile_fetch(None, source))?;

		if !response.is_success() {
			let ProfileResponse { status, body } = response;

			return Err(Error::profile_fetch(Some(status), ProfileStatusError::new(status, body)));
		}

		Profile::from_body(&response.body)
	}

	/// Runs one full authentication attempt for a redirect callback code.
	///
	/// Exchanges the code, fetches the profile, then hands both to the verify
	/// hook. The first failing step terminates the attempt; later steps are
	/// never reached.
	pub async fn authenticate(&self, code: &str) -> Result<V::User> {
		let exchange_span = StageSpan::new(AuthStage::Exchange);
		let tokens = exchange_span
			.instrument(self.facade.exchange_code(self.http_client.as_ref(), code))
			.await?;
		let profile = self.user_profile(&tokens.access_token).await?;
		let verify_span = StageSpan::new(AuthStage::Verify);

		verify_span.instrument(self.verify.verify(&tokens, profile)).await.map_err(Error::Verify)
	}
}
#[cfg(feature = "reqwest")]
impl<V> Strategy<ReqwestHttpClient, V>
where
	V: ?Sized + VerifyUser,
{
	/// Creates a strategy that provisions its own reqwest-backed transport
	/// carrying the resolved header set (including `User-Agent`).
	pub fn new(config: StrategyConfig, verify: impl Into<Arc<V>>) -> Result<Self> {
		let http_client = ReqwestHttpClient::from_config(&config)?;

		Self::with_http_client(config, http_client, verify)
	}
}
impl<C, V> Debug for Strategy<C, V>
where
	C: ?Sized + StrategyHttpClient,
	V: ?Sized + VerifyUser,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Strategy")
			.field("name", &STRATEGY_NAME)
			.field("config", &self.config)
			.finish()
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// std
	use std::collections::HashMap;
	// self
	use super::*;

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

	fn build_strategy(scopes: &[&str]) -> ReqwestStrategy<NoopVerify> {
		let config = StrategyConfig::builder(
			"client-123",
			"secret-456",
			Url::parse("https://www.example.net/auth/thegrid/callback")
				.expect("Callback URL fixture should parse successfully."),
		)
		.scopes(scopes.iter().copied())
		.build()
		.expect("Configuration should build with defaults.");

		Strategy::new(config, NoopVerify).expect("Strategy should build with defaults.")
	}

	#[test]
	fn exposes_the_fixed_strategy_name() {
		assert_eq!(build_strategy(&[]).name(), "thegrid");
	}

	#[test]
	fn authorization_url_carries_the_standard_parameters() {
		let strategy = build_strategy(&["user", "apps"]);
		let url = strategy.authorization_url("state-789");

		assert_eq!(url.host_str(), Some("passport.thegrid.io"));
		assert_eq!(url.path(), "/login/authorize");

		let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();

		assert_eq!(pairs.get("response_type"), Some(&"code".into()));
		assert_eq!(pairs.get("client_id"), Some(&"client-123".into()));
		assert_eq!(
			pairs.get("redirect_uri"),
			Some(&"https://www.example.net/auth/thegrid/callback".into())
		);
		assert_eq!(pairs.get("scope"), Some(&"user,apps".into()));
		assert_eq!(pairs.get("state"), Some(&"state-789".into()));
	}

	#[test]
	fn authorization_url_omits_the_scope_param_without_scopes() {
		let url = build_strategy(&[]).authorization_url("state-000");

		assert!(url.query_pairs().all(|(name, _)| name != "scope"));
	}

	#[test]
	fn debug_output_never_leaks_the_client_secret() {
		let rendered = format!("{:?}", build_strategy(&[]));

		assert!(!rendered.contains("secret-456"));
	}
}
