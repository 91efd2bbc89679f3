//! Error type definitions.
//!
//! This module defines the error types used throughout the application.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for catalog storage operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file or its parent directory.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Schema migration error.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// The query matched no rows.
    #[error("no server found matching {0}")]
    NotFound(String),
}

impl DatabaseError {
    /// Returns true when the error only means "nothing matched".
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound(_))
    }
}

/// A reachability test could not even be constructed for one target.
///
/// This is scoped to the target it was raised for: the pool records it in that
/// target's outcome and keeps probing the rest of the batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeSetupError {
    /// The target address is not a valid IP address.
    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    /// The local socket could not be created.
    #[error("socket setup failed: {0}")]
    Socket(String),

    /// The reachability test panicked.
    #[error("probe panicked: {0}")]
    Panicked(String),
}

/// Rejected probe pool configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeConfigError {
    /// Worker count must be at least one.
    #[error("worker count must be at least 1")]
    NoWorkers,

    /// Per-probe timeout must be positive.
    #[error("probe timeout must be greater than zero")]
    ZeroTimeout,

    /// Queue capacity must be at least one.
    #[error("queue capacity must be at least 1")]
    ZeroCapacity,
}

/// A target could not be handed to the probe pool.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// The pipeline was cancelled while waiting for a queue slot.
    #[error("probing was cancelled")]
    Cancelled,

    /// Every worker has already exited.
    #[error("probe pool is closed")]
    Closed,
}

/// Failures that stop a probe pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The pool configuration was rejected before anything started.
    #[error("invalid probe configuration: {0}")]
    Config(#[from] ProbeConfigError),

    /// Writing rendered outcomes failed.
    #[error("failed to write probe results: {0}")]
    Output(#[from] std::io::Error),

    /// Fewer outcomes came back than targets were submitted.
    #[error("only {rendered} of {submitted} submitted target(s) produced a result")]
    Incomplete {
        /// Targets accepted by the pool.
        submitted: usize,
        /// Outcomes that reached the sink.
        rendered: usize,
    },
}

/// Error types for downloading and decoding the server feed.
#[derive(Error, Debug)]
pub enum FeedError {
    /// Transport-level failure while downloading the feed.
    #[error("feed request failed: {0}")]
    Http(#[from] ReqwestError),

    /// The feed endpoint answered with a non-success status.
    #[error("feed endpoint returned HTTP {0}")]
    Status(u16),

    /// The CSV stream itself is unreadable.
    #[error("feed is not valid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A single row could not be turned into a record.
    #[error("row {line}: {reason}")]
    Row {
        /// 1-based line number in the feed.
        line: u64,
        /// What was wrong with the row.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_the_search() {
        let err = DatabaseError::NotFound("host 'zz-missing'".to_string());
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "no server found matching host 'zz-missing'");
    }

    #[test]
    fn test_sql_error_is_not_not_found() {
        let err = DatabaseError::SqlError(sqlx::Error::RowNotFound);
        assert!(!err.is_not_found());
        assert!(err.to_string().starts_with("SQL error"));
    }

    #[test]
    fn test_probe_setup_error_display() {
        let err = ProbeSetupError::InvalidAddress("300.1.1.1".to_string());
        assert_eq!(err.to_string(), "invalid address '300.1.1.1'");
    }

    #[test]
    fn test_incomplete_pipeline_display() {
        let err = PipelineError::Incomplete {
            submitted: 4,
            rendered: 1,
        };
        assert_eq!(
            err.to_string(),
            "only 1 of 4 submitted target(s) produced a result"
        );
    }

    #[test]
    fn test_feed_row_error_display() {
        let err = FeedError::Row {
            line: 7,
            reason: "expected 15 columns, got 3".to_string(),
        };
        assert_eq!(err.to_string(), "row 7: expected 15 columns, got 3");
    }
}
