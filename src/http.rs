//! Transport primitives for provider requests.
//!
//! The module exposes [`StrategyHttpClient`], the strategy's only dependency on
//! an HTTP stack. One capability covers the token exchange (an
//! [`AsyncHttpClient`] handle consumed by the `oauth2` facade) and one covers
//! the single authenticated GET against the profile endpoint. The default
//! [`ReqwestHttpClient`] implementation carries the resolved header set
//! (including `User-Agent`) on every outbound request.

// std
use std::ops::Deref;
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError};
#[cfg(feature = "reqwest")] use oauth2::{HttpRequest, HttpResponse};
#[cfg(feature = "reqwest")]
use reqwest::{
	header::{HeaderMap, HeaderName, HeaderValue},
	redirect::Policy,
};
// self
use crate::_prelude::*;
#[cfg(feature = "reqwest")] use crate::{config::StrategyConfig, error::ConfigError};

/// Future type returned by [`StrategyHttpClient::get_profile`].
pub type ProfileFuture<'a, E> =
	Pin<Box<dyn Future<Output = Result<ProfileResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing the strategy's two
/// outbound operations: the authorization-code exchange and the profile fetch.
///
/// Callers provide an implementation (typically behind `Arc<T>` where
/// `T: StrategyHttpClient`) when constructing a [`Strategy`](crate::strategy::Strategy).
/// Implementations must be `Send + Sync + 'static` so one strategy value can
/// serve concurrent authentication attempts, and the futures they return must
/// be `Send` for the lifetime of the in-flight request.
pub trait StrategyHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle handed to the `oauth2` facade for the token exchange.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds the handle used for one token exchange.
	fn exchange_handle(&self) -> Self::Handle;

	/// Issues one authenticated GET against `url` with `access_token` as the
	/// bearer credential.
	///
	/// Implementations must perform exactly one outbound request per call and
	/// return the verbatim body alongside the status code, without retrying.
	fn get_profile<'a>(
		&'a self,
		url: &'a Url,
		access_token: &'a str,
	) -> ProfileFuture<'a, Self::TransportError>;
}

/// Raw response captured from the profile endpoint.
#[derive(Clone, Debug)]
pub struct ProfileResponse {
	/// HTTP status code returned by the profile endpoint.
	pub status: u16,
	/// Verbatim response body.
	pub body: String,
}
impl ProfileResponse {
	/// Whether the status code is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// Token requests do not follow redirects, matching OAuth 2.0 guidance that token
/// endpoints return results directly instead of delegating to another URI.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	///
	/// The caller is responsible for attaching default headers (the resolved
	/// `User-Agent` in particular) and disabling redirect following.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client carrying the configuration's resolved header set.
	pub fn from_config(config: &StrategyConfig) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.default_headers(header_map(config)?)
			.redirect(Policy::none())
			.build()?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl StrategyHttpClient for ReqwestHttpClient {
	type Handle = ReqwestExchangeHandle;
	type TransportError = ReqwestError;

	fn exchange_handle(&self) -> Self::Handle {
		ReqwestExchangeHandle(self.0.clone())
	}

	fn get_profile<'a>(
		&'a self,
		url: &'a Url,
		access_token: &'a str,
	) -> ProfileFuture<'a, Self::TransportError> {
		Box::pin(async move {
			let response = self.0.get(url.clone()).bearer_auth(access_token).send().await?;
			let status = response.status().as_u16();
			let body = response.text().await?;

			Ok(ProfileResponse { status, body })
		})
	}
}

/// Handle returned by [`ReqwestHttpClient::exchange_handle`] that satisfies the
/// `oauth2` crate's [`AsyncHttpClient`] contract.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestExchangeHandle(ReqwestClient);
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for ReqwestExchangeHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = self.0.clone();

		Box::pin(async move {
			let response =
				client.execute(request.try_into().map_err(Box::new)?).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

/// Converts the resolved header set into a reqwest [`HeaderMap`].
#[cfg(feature = "reqwest")]
pub(crate) fn header_map(config: &StrategyConfig) -> Result<HeaderMap, ConfigError> {
	let mut headers = HeaderMap::with_capacity(config.headers.len());

	for (name, value) in &config.headers {
		let parsed_name = HeaderName::from_bytes(name.as_bytes())
			.map_err(|_| ConfigError::InvalidHeader { name: name.clone() })?;
		let parsed_value = HeaderValue::from_str(value)
			.map_err(|_| ConfigError::InvalidHeader { name: name.clone() })?;

		headers.insert(parsed_name, parsed_value);
	}

	Ok(headers)
}
