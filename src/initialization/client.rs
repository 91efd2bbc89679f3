//! HTTP client initialization.

use reqwest::ClientBuilder;

use crate::config::FEED_TIMEOUT;
use crate::error_handling::InitializationError;

/// User-Agent sent with feed requests.
pub const USER_AGENT: &str = concat!("vpnlist/", env!("CARGO_PKG_VERSION"));

/// Builds the client used to download the server feed.
///
/// The whole request (connect, headers and body) is bounded by
/// [`FEED_TIMEOUT`]; the feed is a few megabytes of CSV so this is generous.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if the TLS backend cannot be
/// initialized.
pub fn init_client() -> Result<reqwest::Client, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(FEED_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}
