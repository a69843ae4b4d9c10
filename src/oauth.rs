//! Internal facade over the generic `oauth2` client.
//!
//! Protocol mechanics (code-for-token exchange, client authentication, wire
//! formats) are delegated wholesale to the `oauth2` crate; this module only
//! configures it from a resolved [`StrategyConfig`] and maps its errors into
//! the strategy taxonomy.

pub use oauth2;

// crates.io
use oauth2::{
	AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RedirectUrl, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError},
};
// self
use crate::{
	_prelude::*, config::StrategyConfig, error::ConfigError, http::StrategyHttpClient,
};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Tokens returned by a successful authorization-code exchange.
///
/// The strategy neither stores nor refreshes these; they are forwarded to the
/// profile fetch and the application verify hook, then dropped.
#[derive(Clone)]
pub struct TokenSet {
	/// Opaque bearer credential for provider API calls.
	pub access_token: String,
	/// Optional refresh token, when the provider issues one.
	pub refresh_token: Option<String>,
	/// Remaining validity reported by the token endpoint, when present.
	pub expires_in: Option<Duration>,
}
impl Debug for TokenSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenSet")
			.field("access_token", &"<redacted>")
			.field("refresh_token_set", &self.refresh_token.is_some())
			.field("expires_in", &self.expires_in)
			.finish()
	}
}

/// Configured `oauth2` client plus error mapping, owned by the strategy.
pub(crate) struct ExchangeFacade {
	oauth_client: ConfiguredBasicClient,
}
impl ExchangeFacade {
	pub(crate) fn from_config(config: &StrategyConfig) -> Result<Self> {
		let auth_url = AuthUrl::new(config.authorization_url.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let token_url = TokenUrl::new(config.token_url.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let redirect_url = RedirectUrl::new(config.callback_url.to_string())
			.map_err(|source| ConfigError::InvalidRedirect { source })?;
		let oauth_client = BasicClient::new(ClientId::new(config.client_id.clone()))
			.set_client_secret(ClientSecret::new(config.client_secret.clone()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_redirect_uri(redirect_url);

		Ok(Self { oauth_client })
	}

	/// Exchanges one authorization code for a [`TokenSet`].
	pub(crate) async fn exchange_code<C>(&self, http_client: &C, code: &str) -> Result<TokenSet>
	where
		C: ?Sized + StrategyHttpClient,
	{
		let handle = http_client.exchange_handle();
		let response = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.request_async(&handle)
			.await
			.map_err(map_exchange_error)?;
		let expires_in = response
			.expires_in()
			.and_then(|value| i64::try_from(value.as_secs()).ok())
			.map(Duration::seconds);

		Ok(TokenSet {
			access_token: response.access_token().secret().to_owned(),
			refresh_token: response.refresh_token().map(|secret| secret.secret().to_owned()),
			expires_in,
		})
	}
}

fn map_exchange_error<E>(err: BasicRequestTokenError<HttpClientError<E>>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		RequestTokenError::ServerResponse(response) =>
			Error::Exchange { reason: exchange_reason(&response) },
		RequestTokenError::Request(error) => map_transport_error(error),
		RequestTokenError::Parse(source, _body) => Error::ExchangeParse { source },
		RequestTokenError::Other(message) => Error::Exchange { reason: message },
	}
}

fn exchange_reason(response: &BasicErrorResponse) -> String {
	if let Some(description) = response.error_description() {
		description.clone()
	} else {
		response.error().as_ref().to_owned()
	}
}

fn map_transport_error<E>(err: HttpClientError<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => Error::Transport { source: inner },
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => Error::Transport { source: Box::new(inner) },
		HttpClientError::Other(message) => Error::Exchange { reason: message },
		_ => Error::Exchange { reason: "Unhandled HTTP client error variant.".into() },
	}
}
