//! vpnlist library: a local catalog of VPN Gate relays.
//!
//! The catalog is a SQLite database of relays downloaded from the public
//! VPN Gate feed. Records are merged by host name, queried by country and
//! speed, and can be checked for reachability by a bounded pool of probe
//! workers whose results are rendered as they complete.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use vpnlist::probe::{ProbeConfig, TcpProber};
//! use vpnlist::{probe_all, QueryFilter, RecordStore};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RecordStore::open(std::path::Path::new("vpnlist.db")).await?;
//! let filter = QueryFilter::new().with_countries(["JP"]).with_min_speed_mbps(10);
//! let targets = store.query_filtered(&filter).await?;
//!
//! let prober = Arc::new(TcpProber::default());
//! let outcomes = probe_all(targets, &ProbeConfig::default(), prober).await?;
//! for outcome in outcomes.iter().filter(|o| o.is_reachable()) {
//!     println!("{}", outcome.target);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! Probing and storage require a Tokio runtime.

pub mod app;
pub mod config;
pub mod error_handling;
pub mod feed;
pub mod initialization;
pub mod pipeline;
pub mod probe;
pub mod sink;
pub mod storage;

// Re-export public API
pub use config::{Command, LogFormat, LogLevel, Opt};
pub use error_handling::{DatabaseError, FeedError, PipelineError, ProbeSetupError};
pub use pipeline::{probe_all, run_probe_pipeline, PipelineReport};
pub use sink::{CollectingSink, ResultSink, TableSink};
pub use storage::{CatalogRecord, ProbeTarget, QueryFilter, RecordStore, ServerConfig};
