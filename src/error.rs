//! Strategy-level error types shared by the configuration, exchange, and profile layers.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical strategy error exposed by public APIs.
///
/// Every error is terminal for the authentication attempt it belongs to and is
/// reported exactly once; the strategy never retries or logs internally.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS) while calling the provider.
	#[error("Network error occurred while calling the provider.")]
	Transport {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Token endpoint rejected the authorization-code exchange.
	#[error("Token endpoint rejected the exchange: {reason}.")]
	Exchange {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Token endpoint responded with malformed JSON.
	#[error("Token endpoint returned malformed JSON.")]
	ExchangeParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Profile endpoint request failed at the HTTP or network layer.
	#[error("Failed to fetch user profile.")]
	ProfileFetch {
		/// HTTP status code, when the provider responded at all.
		status: Option<u16>,
		/// Underlying transport or HTTP failure.
		#[source]
		source: BoxError,
	},
	/// Profile endpoint body is not valid JSON. No partial profile is produced.
	#[error("Profile endpoint returned malformed JSON.")]
	ProfileParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Application-supplied verify hook failed.
	#[error("Verify hook failed.")]
	Verify(#[source] BoxError),
}
impl Error {
	/// Wraps a profile endpoint failure with the fixed profile-fetch message.
	pub fn profile_fetch(
		status: Option<u16>,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::ProfileFetch { status, source: Box::new(src) }
	}
}

/// Configuration and validation failures raised while building a strategy.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Provider endpoint URL rejected by the OAuth client facade.
	#[error("Endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Callback URL cannot be converted into an OAuth redirect URL.
	#[error("Callback URL is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Provider endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Reject scope separators that are control characters.
	#[error("Scope separator must be a printable character.")]
	InvalidScopeSeparator {
		/// Invalid separator that was supplied.
		separator: char,
	},
	/// Custom header name or value contains characters HTTP cannot carry.
	#[error("Custom header `{name}` is not a valid HTTP header.")]
	InvalidHeader {
		/// Offending header name.
		name: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Non-success status returned by the profile endpoint.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Profile endpoint returned HTTP {status}: {body_preview}")]
pub struct ProfileStatusError {
	/// HTTP status code.
	pub status: u16,
	/// Truncated response body kept for diagnostics.
	pub body_preview: String,
}
impl ProfileStatusError {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Creates a status error, truncating the body to a bounded preview.
	pub fn new(status: u16, body: impl Into<String>) -> Self {
		Self { status, body_preview: truncate_preview(body.into()) }
	}
}

fn truncate_preview(body: String) -> String {
	if body.chars().count() <= ProfileStatusError::BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf = String::new();

	for (idx, ch) in body.chars().enumerate() {
		if idx >= ProfileStatusError::BODY_PREVIEW_LIMIT {
			buf.push('…');

			break;
		}
		buf.push(ch);
	}

	buf
}
