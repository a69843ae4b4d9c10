//! Strategy configuration, provider defaults, and resolution rules.
//!
//! [`StrategyConfig`] is assembled through [`StrategyConfigBuilder`], which fills
//! in any endpoint, separator, or `User-Agent` value the application omits with
//! the documented TheGrid defaults. The resolved configuration is immutable for
//! the lifetime of the strategy.

// std
use std::collections::BTreeMap;
// self
use crate::{_prelude::*, error::ConfigError};

/// Default authorization endpoint for TheGrid.
pub const DEFAULT_AUTHORIZATION_URL: &str = "https://passport.thegrid.io/login/authorize";
/// Default token endpoint for TheGrid.
pub const DEFAULT_TOKEN_URL: &str = "https://passport.thegrid.io/login/authorize/token";
/// Default profile endpoint for TheGrid.
pub const DEFAULT_PROFILE_URL: &str = "https://passport.thegrid.io/api/user";
/// Default separator used when joining requested scopes into a `scope` parameter.
pub const DEFAULT_SCOPE_SEPARATOR: char = ',';
/// `User-Agent` value sent when the application supplies none.
pub const DEFAULT_USER_AGENT: &str = "passport-thegrid";
/// Header name the user-agent resolution writes into the resolved header set.
pub const USER_AGENT_HEADER: &str = "User-Agent";

/// Immutable, fully resolved strategy configuration.
///
/// Required credential fields (`client_id`, `client_secret`, `callback_url`)
/// are carried as-is without eager presence validation; a bogus credential
/// surfaces when the token exchange is exercised, not at construction time.
#[derive(Clone)]
pub struct StrategyConfig {
	/// OAuth 2.0 client identifier issued by TheGrid.
	pub client_id: String,
	/// OAuth 2.0 client secret issued by TheGrid.
	pub client_secret: String,
	/// URL TheGrid redirects the user to after granting authorization.
	pub callback_url: Url,
	/// Requested permission scopes, in application order.
	pub scopes: Vec<String>,
	/// Authorization endpoint used to start the redirect flow.
	pub authorization_url: Url,
	/// Token endpoint used for the code exchange.
	pub token_url: Url,
	/// Profile endpoint queried after a successful exchange.
	pub profile_url: Url,
	/// Separator joining scopes in the authorize URL.
	pub scope_separator: char,
	/// Resolved header set attached to every outbound provider request.
	/// Always contains a `User-Agent` entry.
	pub headers: BTreeMap<String, String>,
}
impl StrategyConfig {
	/// Creates a new builder seeded with the required credential fields.
	pub fn builder(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		callback_url: Url,
	) -> StrategyConfigBuilder {
		StrategyConfigBuilder::new(client_id, client_secret, callback_url)
	}

	/// Joins the requested scopes with the configured separator.
	///
	/// Returns `None` when no scopes were requested so callers can omit the
	/// `scope` parameter entirely.
	pub(crate) fn scope_param(&self) -> Option<String> {
		if self.scopes.is_empty() {
			return None;
		}

		let mut buf = String::new();

		for (idx, value) in self.scopes.iter().enumerate() {
			if idx > 0 {
				buf.push(self.scope_separator);
			}

			buf.push_str(value);
		}

		Some(buf)
	}

	/// Returns the resolved `User-Agent` value.
	pub fn user_agent(&self) -> &str {
		self.headers
			.iter()
			.find(|(name, _)| name.eq_ignore_ascii_case(USER_AGENT_HEADER))
			.map(|(_, value)| value.as_str())
			.unwrap_or(DEFAULT_USER_AGENT)
	}
}
impl Debug for StrategyConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StrategyConfig")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &!self.client_secret.is_empty())
			.field("callback_url", &self.callback_url)
			.field("scopes", &self.scopes)
			.field("authorization_url", &self.authorization_url)
			.field("token_url", &self.token_url)
			.field("profile_url", &self.profile_url)
			.field("scope_separator", &self.scope_separator)
			.field("headers", &self.headers)
			.finish()
	}
}

/// Builder for [`StrategyConfig`] values.
#[derive(Clone, Debug)]
pub struct StrategyConfigBuilder {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: String,
	/// Redirect URL registered with the provider.
	pub callback_url: Url,
	/// Requested permission scopes.
	pub scopes: Vec<String>,
	/// Optional authorization endpoint override.
	pub authorization_url: Option<Url>,
	/// Optional token endpoint override.
	pub token_url: Option<Url>,
	/// Optional profile endpoint override.
	pub profile_url: Option<Url>,
	/// Optional scope separator override.
	pub scope_separator: Option<char>,
	/// Optional `User-Agent` value, used only when no explicit header is set.
	pub user_agent: Option<String>,
	/// Extra headers attached to every outbound provider request.
	pub custom_headers: BTreeMap<String, String>,
}
impl StrategyConfigBuilder {
	/// Creates a new builder seeded with the required credential fields.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		callback_url: Url,
	) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			callback_url,
			scopes: Vec::new(),
			authorization_url: None,
			token_url: None,
			profile_url: None,
			scope_separator: None,
			user_agent: None,
			custom_headers: BTreeMap::new(),
		}
	}

	/// Adds a single requested scope.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scopes.push(scope.into());

		self
	}

	/// Adds multiple requested scopes, preserving order.
	pub fn scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes.extend(scopes.into_iter().map(Into::into));

		self
	}

	/// Overrides the authorization endpoint.
	pub fn authorization_url(mut self, url: Url) -> Self {
		self.authorization_url = Some(url);

		self
	}

	/// Overrides the token endpoint.
	pub fn token_url(mut self, url: Url) -> Self {
		self.token_url = Some(url);

		self
	}

	/// Overrides the profile endpoint.
	pub fn profile_url(mut self, url: Url) -> Self {
		self.profile_url = Some(url);

		self
	}

	/// Overrides the scope separator (defaults to `,`).
	pub fn scope_separator(mut self, separator: char) -> Self {
		self.scope_separator = Some(separator);

		self
	}

	/// Sets the `User-Agent` value used when no explicit header is supplied.
	pub fn user_agent(mut self, value: impl Into<String>) -> Self {
		self.user_agent = Some(value.into());

		self
	}

	/// Adds a custom header attached to every outbound provider request.
	///
	/// An explicit `User-Agent` entry here takes precedence over the
	/// [`user_agent`](Self::user_agent) option.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.custom_headers.insert(name.into(), value.into());

		self
	}

	/// Consumes the builder, resolves defaults, and validates the configuration.
	pub fn build(self) -> Result<StrategyConfig, ConfigError> {
		let authorization_url = resolve_url(self.authorization_url, DEFAULT_AUTHORIZATION_URL)?;
		let token_url = resolve_url(self.token_url, DEFAULT_TOKEN_URL)?;
		let profile_url = resolve_url(self.profile_url, DEFAULT_PROFILE_URL)?;
		let scope_separator = self.scope_separator.unwrap_or(DEFAULT_SCOPE_SEPARATOR);
		let mut headers = self.custom_headers;

		if !headers.keys().any(|name| name.eq_ignore_ascii_case(USER_AGENT_HEADER)) {
			headers.insert(
				USER_AGENT_HEADER.into(),
				self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.into()),
			);
		}

		let config = StrategyConfig {
			client_id: self.client_id,
			client_secret: self.client_secret,
			callback_url: self.callback_url,
			scopes: self.scopes,
			authorization_url,
			token_url,
			profile_url,
			scope_separator,
			headers,
		};

		config.validate()?;

		Ok(config)
	}
}

impl StrategyConfig {
	/// Validates invariants for the resolved configuration.
	fn validate(&self) -> Result<(), ConfigError> {
		validate_endpoint("authorization", &self.authorization_url)?;
		validate_endpoint("token", &self.token_url)?;
		validate_endpoint("profile", &self.profile_url)?;
		validate_scope_separator(self.scope_separator)?;

		for (name, value) in &self.headers {
			validate_header(name, value)?;
		}

		Ok(())
	}
}

fn resolve_url(url: Option<Url>, default: &str) -> Result<Url, ConfigError> {
	match url {
		Some(url) => Ok(url),
		None => Url::parse(default).map_err(|source| ConfigError::InvalidEndpoint { source }),
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ConfigError> {
	if url.scheme() != "https" {
		Err(ConfigError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}

fn validate_scope_separator(separator: char) -> Result<(), ConfigError> {
	if separator.is_control() {
		Err(ConfigError::InvalidScopeSeparator { separator })
	} else {
		Ok(())
	}
}

fn validate_header(name: &str, value: &str) -> Result<(), ConfigError> {
	let name_ok = !name.is_empty()
		&& name.chars().all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_'));
	let value_ok = value.chars().all(|ch| matches!(ch, ' ' | '\t') || ch.is_ascii_graphic());

	if name_ok && value_ok { Ok(()) } else { Err(ConfigError::InvalidHeader { name: name.into() }) }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn base_builder() -> StrategyConfigBuilder {
		StrategyConfig::builder(
			"client-123",
			"shhh-its-a-secret",
			Url::parse("https://www.example.net/auth/thegrid/callback")
				.expect("Callback URL fixture should parse successfully."),
		)
	}

	#[test]
	fn missing_optional_fields_resolve_to_documented_defaults() {
		let config = base_builder().build().expect("Configuration should build with defaults.");

		assert_eq!(config.authorization_url.as_str(), DEFAULT_AUTHORIZATION_URL);
		assert_eq!(config.token_url.as_str(), DEFAULT_TOKEN_URL);
		assert_eq!(config.profile_url.as_str(), DEFAULT_PROFILE_URL);
		assert_eq!(config.scope_separator, ',');
		assert_eq!(config.headers.get(USER_AGENT_HEADER).map(String::as_str), Some("passport-thegrid"));
	}

	#[test]
	fn user_agent_option_overrides_the_default() {
		let config = base_builder()
			.user_agent("myapp.com")
			.build()
			.expect("Configuration should build with a custom user agent.");

		assert_eq!(config.user_agent(), "myapp.com");
	}

	#[test]
	fn explicit_user_agent_header_is_never_overwritten() {
		let config = base_builder()
			.header("user-agent", "explicit-header")
			.user_agent("ignored-option")
			.build()
			.expect("Configuration should build with an explicit header.");

		assert_eq!(config.user_agent(), "explicit-header");
		assert!(!config.headers.values().any(|value| value == "ignored-option"));
	}

	#[test]
	fn scope_param_joins_with_the_configured_separator() {
		let config = base_builder()
			.scopes(["user", "apps"])
			.build()
			.expect("Configuration should build with scopes.");

		assert_eq!(config.scope_param(), Some("user,apps".into()));

		let spaced = base_builder()
			.scopes(["user", "apps"])
			.scope_separator(' ')
			.build()
			.expect("Configuration should build with a space separator.");

		assert_eq!(spaced.scope_param(), Some("user apps".into()));
	}

	#[test]
	fn empty_scope_list_omits_the_scope_param() {
		let config = base_builder().build().expect("Configuration should build without scopes.");

		assert_eq!(config.scope_param(), None);
	}

	#[test]
	fn insecure_endpoints_are_rejected() {
		let err = base_builder()
			.profile_url(
				Url::parse("http://passport.thegrid.io/api/user")
					.expect("Profile URL fixture should parse successfully."),
			)
			.build()
			.expect_err("Plain HTTP endpoints should be rejected.");

		assert!(matches!(err, ConfigError::InsecureEndpoint { endpoint: "profile", .. }));
	}

	#[test]
	fn control_character_separators_are_rejected() {
		let err = base_builder()
			.scope_separator('\u{0}')
			.build()
			.expect_err("Control character separators should be rejected.");

		assert!(matches!(err, ConfigError::InvalidScopeSeparator { .. }));
	}

	#[test]
	fn malformed_headers_are_rejected() {
		let err = base_builder()
			.header("X-Bad Name", "value")
			.build()
			.expect_err("Header names with spaces should be rejected.");

		assert!(matches!(err, ConfigError::InvalidHeader { .. }));
	}

	#[test]
	fn debug_output_never_leaks_the_client_secret() {
		let config = base_builder().build().expect("Configuration should build with defaults.");
		let rendered = format!("{config:?}");

		assert!(!rendered.contains("shhh-its-a-secret"));
		assert!(rendered.contains("client_secret_set"));
	}
}
