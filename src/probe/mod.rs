//! Liveness probing.
//!
//! This module provides:
//! - The [`Prober`] trait (one bounded reachability attempt) and [`TcpProber`]
//! - [`ProbeWorkerPool`], a bounded fan-out of probe workers
//! - Probe configuration and outcome types

mod pool;
mod prober;
mod types;

// Re-export public API
pub use pool::ProbeWorkerPool;
pub use prober::{Prober, TcpProber};
pub use types::{ProbeConfig, ProbeOutcome, ProbeStatus, Reachability};
