//! VPN Gate CSV decoding.
//!
//! The feed looks like:
//!
//! ```text
//! *vpn_servers
//! #HostName,IP,Score,Ping,Speed,CountryLong,CountryShort,NumVpnSessions,Uptime,TotalUsers,TotalTraffic,LogType,Operator,Message,OpenVPN_ConfigData_Base64
//! public-vpn-227,219.100.37.12,1234,12,153412345,Japan,JP,...,<base64>
//! *
//! ```
//!
//! Marker lines (`*`) and the header (`#`) are skipped. Rows that cannot be
//! decoded are logged and skipped; they never abort the batch.

use base64::Engine;
use csv::{ReaderBuilder, StringRecord};
use log::{debug, warn};

use crate::config::FEED_COLUMNS;
use crate::error_handling::FeedError;
use crate::storage::CatalogRecord;

/// Records decoded from one feed download.
#[derive(Debug, Default)]
pub struct FeedBatch {
    pub records: Vec<CatalogRecord>,
    /// Data rows that were malformed and left out
    pub skipped: usize,
}

/// Decodes the whole feed text.
///
/// # Errors
///
/// Only an unreadable stream fails the batch; individual bad rows are counted
/// in [`FeedBatch::skipped`].
pub fn parse_feed(text: &str) -> Result<FeedBatch, FeedError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut batch = FeedBatch::default();
    for result in reader.records() {
        let row = match result {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(FeedError::Csv(e)),
            Err(e) => {
                debug!("Skipping unreadable feed row: {e}");
                batch.skipped += 1;
                continue;
            }
        };
        if is_marker(&row) {
            continue;
        }

        match parse_row(&row) {
            Ok(record) => batch.records.push(record),
            Err(e) => {
                debug!("Skipping feed {e}");
                batch.skipped += 1;
            }
        }
    }

    if batch.skipped > 0 {
        warn!(
            "Skipped {} malformed feed row(s), kept {}",
            batch.skipped,
            batch.records.len()
        );
    }
    Ok(batch)
}

fn is_marker(row: &StringRecord) -> bool {
    row.get(0)
        .map(|first| first.starts_with('*') || first.starts_with('#'))
        .unwrap_or(true)
}

/// Decodes one data row.
pub fn parse_row(row: &StringRecord) -> Result<CatalogRecord, FeedError> {
    let line = row.position().map(|p| p.line()).unwrap_or(0);
    let fail = |reason: String| FeedError::Row { line, reason };

    if row.len() != FEED_COLUMNS {
        return Err(fail(format!(
            "expected {FEED_COLUMNS} columns, got {}",
            row.len()
        )));
    }

    let text = |idx: usize| row.get(idx).unwrap_or_default().trim().to_string();
    let int = |idx: usize, name: &str| -> Result<i64, FeedError> {
        let raw = row.get(idx).unwrap_or_default().trim();
        raw.parse::<i64>()
            .map_err(|_| fail(format!("{name} is not an integer: '{raw}'")))
    };

    let host_name = text(0);
    if host_name.is_empty() {
        return Err(fail("empty host name".to_string()));
    }

    let config = base64::engine::general_purpose::STANDARD
        .decode(row.get(14).unwrap_or_default().trim())
        .map_err(|e| fail(format!("config is not valid base64: {e}")))?;

    Ok(CatalogRecord {
        host_name,
        ip: text(1),
        score: int(2, "Score")?,
        ping: int(3, "Ping")?,
        speed: int(4, "Speed")?,
        country_long: text(5),
        country_short: text(6).to_uppercase(),
        num_vpn_sessions: int(7, "NumVpnSessions")?,
        uptime: int(8, "Uptime")?,
        total_users: int(9, "TotalUsers")?,
        total_traffic: int(10, "TotalTraffic")?,
        log_type: text(11),
        operator: text(12),
        message: text(13),
        config,
    })
}
