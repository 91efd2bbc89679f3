//! Process-wide resource setup: logging and the HTTP client.

mod client;
mod logger;

pub use client::{init_client, USER_AGENT};
pub use logger::init_logger_with;
