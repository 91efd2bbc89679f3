//! Command-line application layer.
//!
//! Subcommand handlers, config output and Ctrl-C handling used by the binary.

pub mod commands;
pub mod output;
pub mod shutdown;

pub use commands::{run_command, RunContext};
pub use output::{save_config, write_config};
pub use shutdown::cancel_on_ctrl_c;
