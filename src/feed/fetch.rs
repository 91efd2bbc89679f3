//! Feed download.

use log::{debug, info};

use crate::error_handling::FeedError;

use super::parse::{parse_feed, FeedBatch};

/// Downloads the raw feed body.
///
/// # Errors
///
/// `FeedError::Http` on transport failures, `FeedError::Status` for any
/// non-success HTTP status.
pub async fn fetch_feed(client: &reqwest::Client, url: &str) -> Result<String, FeedError> {
    debug!("Downloading server list from {url}");
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::Status(status.as_u16()));
    }

    let body = response.text().await?;
    debug!("Downloaded {} byte(s) from {url}", body.len());
    Ok(body)
}

/// Downloads and decodes the feed in one step.
pub async fn download_records(
    client: &reqwest::Client,
    url: &str,
) -> Result<FeedBatch, FeedError> {
    let body = fetch_feed(client, url).await?;
    let batch = parse_feed(&body)?;
    info!(
        "Feed yielded {} server(s), {} row(s) skipped",
        batch.records.len(),
        batch.skipped
    );
    Ok(batch)
}
