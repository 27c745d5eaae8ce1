//! HTTP utilities for FPL API communication

use crate::Result;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use std::time::Duration;

/// User agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("fpl-draft/", env!("CARGO_PKG_VERSION"));

/// Headers sent with every request: JSON accept + user agent.
pub fn default_headers() -> Result<HeaderMap> {
    let mut h = HeaderMap::new();
    h.insert(ACCEPT, HeaderValue::from_static("application/json"));
    h.insert(USER_AGENT, HeaderValue::from_str(DEFAULT_USER_AGENT)?);
    Ok(h)
}

/// Build the shared client. `timeout` bounds every request end to end.
pub fn build_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .default_headers(default_headers()?)
        .timeout(timeout)
        .build()?;
    Ok(client)
}
