//! Configuration constants.
//!
//! Defaults for the CLI and the probing pipeline.

use std::path::PathBuf;
use std::time::Duration;

/// Directory under the user config directory that holds the database.
pub const DB_DIR_NAME: &str = "vpnlist";

/// Database file name inside [`DB_DIR_NAME`].
pub const DB_FILE_NAME: &str = "db.sqlite";

/// Environment variable that overrides the database path.
pub const DB_PATH_ENV: &str = "VPNLIST_DB_PATH";

/// Default database path, `<user config dir>/vpnlist/db.sqlite`.
///
/// `None` when the platform has no user config directory (no `$HOME` and no
/// `$XDG_CONFIG_HOME` on Linux).
pub fn default_db_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(DB_DIR_NAME).join(DB_FILE_NAME))
}

/// VPN Gate public relay list (CSV).
pub const FEED_URL: &str = "http://www.vpngate.net/api/iphone/";

/// Timeout for the whole feed download.
/// The list is a few megabytes of base64 configs and the endpoint is slow.
pub const FEED_TIMEOUT: Duration = Duration::from_secs(60);

/// Number of columns in a feed row.
pub const FEED_COLUMNS: usize = 15;

/// Domain suffix VPN Gate relays are published under.
pub const HOST_DOMAIN_SUFFIX: &str = ".opengw.net";

/// Speed values are entered in Mbps and stored in bits per second.
pub const BITS_PER_MBIT: i64 = 1_000_000;

// Probing defaults
/// Number of concurrent probe workers
pub const DEFAULT_PROBE_WORKERS: usize = 1;
/// Per-probe timeout
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(500);
/// Capacity of both the work queue and the result queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 50;
/// TCP port probed on each relay
pub const DEFAULT_PROBE_PORT: u16 = 443;
