//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (defaults, feed location, limits)
//! - CLI option types and parsing

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Command, FilterArgs, ListArgs, LogFormat, LogLevel, Opt};
