// storage/models.rs
// Catalog row types and query projections

use std::fmt;

use sqlx::FromRow;

use crate::config::{BITS_PER_MBIT, HOST_DOMAIN_SUFFIX};

/// One advertised VPN Gate relay.
///
/// # Database Schema
///
/// This struct maps directly to the `servers` table. `host_name` is the unique
/// key; every other column is replaced wholesale when the same host is upserted
/// again. Counters are stored as SQLite `INTEGER` (i64). The OpenVPN
/// configuration is kept as raw bytes in a `BLOB` column.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CatalogRecord {
    pub host_name: String,
    pub ip: String,
    pub score: i64,
    /// Ping quoted by the feed, in milliseconds.
    pub ping: i64,
    /// Advertised line speed in bits per second.
    pub speed: i64,
    pub country_long: String,
    pub country_short: String,
    pub num_vpn_sessions: i64,
    pub uptime: i64,
    pub total_users: i64,
    pub total_traffic: i64,
    pub log_type: String,
    pub operator: String,
    pub message: String,
    pub config: Vec<u8>,
}

impl CatalogRecord {
    /// File name an exported configuration is saved under.
    pub fn file_name(&self) -> String {
        config_file_name(&self.country_short, &self.host_name, &self.ip)
    }
}

/// Display projection of a [`CatalogRecord`] used for listing and probing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, FromRow)]
pub struct ProbeTarget {
    pub host_name: String,
    pub ip: String,
    pub ping: i64,
    pub speed: i64,
    pub country_short: String,
}

impl ProbeTarget {
    /// Column header matching the [`fmt::Display`] layout.
    pub fn header() -> String {
        format!("{:<3}\t{:<17}\t{:<17}\t{:<12}", "", "IP", "Host", "Speed")
    }

    /// Advertised speed in Mbps.
    pub fn speed_mbps(&self) -> f64 {
        self.speed as f64 / BITS_PER_MBIT as f64
    }
}

impl fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<3}\t{:<17}\t{:<17}\t{:<7.2} Mbps",
            self.country_short,
            self.ip,
            self.host_name,
            self.speed_mbps()
        )
    }
}

/// A single server's OpenVPN configuration with enough context to print it.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ServerConfig {
    pub host_name: String,
    pub ip: String,
    pub country_long: String,
    pub country_short: String,
    pub config: Vec<u8>,
}

impl ServerConfig {
    /// Fully qualified relay host name.
    pub fn fqdn(&self) -> String {
        format!("{}{}", self.host_name, HOST_DOMAIN_SUFFIX)
    }

    /// File name an exported configuration is saved under.
    pub fn file_name(&self) -> String {
        config_file_name(&self.country_short, &self.host_name, &self.ip)
    }
}

fn config_file_name(country_short: &str, host_name: &str, ip: &str) -> String {
    format!("{country_short}_{host_name}_{ip}.ovpn")
}
