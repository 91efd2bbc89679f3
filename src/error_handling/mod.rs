//! Error handling.
//!
//! Error types are split by the layer that raises them:
//! - **Storage**: catalog persistence failures and empty lookups
//! - **Probe**: per-target setup failures and pool misconfiguration
//! - **Feed**: download and row decoding failures
//! - **Initialization**: logger and HTTP client setup

mod types;

// Re-export public API
pub use types::{
    DatabaseError, FeedError, InitializationError, PipelineError, ProbeConfigError,
    ProbeSetupError, SubmitError,
};
