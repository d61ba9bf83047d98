//! Shared outbound HTTP client

use reqwest::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!("tubefetch/", env!("CARGO_PKG_VERSION"));

/// Client used for token exchange, metadata calls and media streams.
///
/// Only the connect phase is bounded; media transfers run as long as the
/// remote keeps sending.
pub fn build_http_client() -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(30))
        .build()
}
