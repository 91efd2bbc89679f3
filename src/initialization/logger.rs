//! Logger initialization.

use std::io::Write;

use colored::Colorize;
use env_logger::Target;
use log::LevelFilter;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;

/// Initializes the global logger.
///
/// `RUST_LOG` is read first and `level` then overrides it for this crate, so
/// `RUST_LOG=sqlx=debug vpnlist update` still works for digging into
/// dependencies. Logs always go to stderr; stdout is reserved for command
/// output such as `.ovpn` configs, which are often piped to a file.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already set.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.target(Target::Stderr);
    builder.filter_level(level);
    builder.filter_module("sqlx", LevelFilter::Warn);
    builder.filter_module("reqwest", LevelFilter::Warn);
    builder.filter_module("hyper", LevelFilter::Warn);
    builder.filter_module("hyper_util", LevelFilter::Warn);
    builder.filter_module("vpnlist", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{{\"ts\":{},\"level\":\"{}\",\"target\":\"{}\",\"msg\":{}}}",
                    chrono::Utc::now().timestamp_millis(),
                    record.level(),
                    record.target(),
                    serde_json::to_string(&record.args().to_string())
                        .unwrap_or_else(|_| "\"\"".into())
                )
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                let level = record.level().to_string();
                let level = match record.level() {
                    log::Level::Error => level.red(),
                    log::Level::Warn => level.yellow(),
                    log::Level::Info => level.green(),
                    log::Level::Debug => level.blue(),
                    log::Level::Trace => level.purple(),
                };
                writeln!(
                    buf,
                    "{} [{}] {}",
                    record.target().cyan(),
                    level,
                    record.args()
                )
            });
        }
    }

    builder.try_init()?;
    Ok(())
}
