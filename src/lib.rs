//! TheGrid OAuth 2.0 authentication strategy: provider defaults, code-for-token exchange, and
//! normalized user profiles behind one pluggable type.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod profile;
pub mod strategy;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::StrategyConfig,
		http::{self, ReqwestHttpClient},
		strategy::{ReqwestStrategy, Strategy, VerifyUser},
	};

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests, carrying the configuration's resolved header set.
	pub fn test_reqwest_http_client(config: &StrategyConfig) -> ReqwestHttpClient {
		let headers =
			http::header_map(config).expect("Failed to convert resolved headers for tests.");
		let client = ReqwestClient::builder()
			.default_headers(headers)
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a [`ReqwestStrategy`] backed by the insecure test transport.
	pub fn build_reqwest_test_strategy<V>(
		config: StrategyConfig,
		verify: impl Into<Arc<V>>,
	) -> ReqwestStrategy<V>
	where
		V: VerifyUser,
	{
		let http_client = test_reqwest_http_client(&config);

		Strategy::with_http_client(config, http_client, verify)
			.expect("Failed to build test strategy.")
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::Duration;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _, thegrid_strategy as _};
