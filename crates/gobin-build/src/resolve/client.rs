//! HTTP client construction for go-import discovery

use reqwest::Client;
use std::time::Duration;

/// Default timeout for discovery requests (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent with discovery requests
pub const USER_AGENT: &str = concat!("gobin/", env!("CARGO_PKG_VERSION"));

/// Builds the HTTP client used to fetch `?go-get=1` pages
///
/// # Errors
///
/// Returns error if client construction fails
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

/// Builds HTTP client with default timeout
pub fn build_default_client() -> Result<Client, reqwest::Error> {
    build_client(DEFAULT_TIMEOUT)
}
