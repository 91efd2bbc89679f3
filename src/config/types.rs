//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{Args, ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand, ValueEnum};

use crate::config::constants::{
    default_db_path, DB_PATH_ENV, DEFAULT_PROBE_PORT, DEFAULT_PROBE_WORKERS,
    DEFAULT_QUEUE_CAPACITY, FEED_URL,
};
use crate::probe::ProbeConfig;
use crate::storage::QueryFilter;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Command-line options.
///
/// Running without a subcommand lists the stored servers, so the `list` flags
/// are also accepted at the top level.
///
/// # Examples
///
/// ```bash
/// # Download the current relay list
/// vpnlist update
///
/// # Japanese and Korean servers faster than 50 Mbps, checked 20 at a time
/// vpnlist -c jp,kr -s 50 --ping -w 20
///
/// # Dump a random US config to a file
/// vpnlist random -c us -o ./configs/
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "vpnlist",
    about = "Stores VPN Gate relays in a local catalog, lists them and checks which are online.",
    long_about = "Parses vpngate.net for OpenVPN configs and stores them locally.\n\
                  Without a subcommand, lists all servers stored in the database."
)]
pub struct Opt {
    /// Database path (SQLite file) [default: <config dir>/vpnlist/db.sqlite]
    #[arg(long, global = true, env = DB_PATH_ENV)]
    pub db_path: Option<PathBuf>,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub list: ListArgs,
}

impl Opt {
    /// Parses the process arguments, printing usage and exiting on error.
    pub fn parse_args() -> Self {
        Self::try_parse_args(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    /// Parses `args` like [`Parser::try_parse_from`].
    ///
    /// Top-level `list` flags only apply when no subcommand is given, so
    /// `vpnlist -p list -c jp` is rejected instead of dropping `-p`.
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut cmd = Self::command();
        let mut matches = cmd.try_get_matches_from_mut(args)?;
        if let Some((name, _)) = matches.subcommand() {
            if let Some(flag) = top_level_list_flag(&matches) {
                let message = format!(
                    "the argument '{flag}' must be passed after the '{name}' subcommand"
                );
                return Err(cmd.error(ErrorKind::ArgumentConflict, message));
            }
        }
        Self::from_arg_matches_mut(&mut matches).map_err(|e| e.format(&mut cmd))
    }

    /// Database path from `--db-path` or `VPNLIST_DB_PATH`, else the default
    /// under the user config directory.
    pub fn resolve_db_path(&self) -> Option<PathBuf> {
        self.db_path.clone().or_else(default_db_path)
    }

    /// Resolves the subcommand to run, falling back to `list` with the top-level flags.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::List(self.list))
    }
}

/// First `list` flag given on the command line before a subcommand.
fn top_level_list_flag(matches: &ArgMatches) -> Option<String> {
    let list = ListArgs::augment_args(clap::Command::new("list"));
    let flag = list
        .get_arguments()
        .find(|arg| matches.value_source(arg.get_id().as_str()) == Some(ValueSource::CommandLine))
        .map(|arg| match arg.get_long() {
            Some(long) => format!("--{long}"),
            None => arg.get_id().to_string(),
        });
    flag
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List server records (the default)
    List(ListArgs),

    /// Get vpn servers info from vpngate.net and save it locally
    Update {
        /// Feed URL
        #[arg(long, default_value = FEED_URL)]
        url: String,
    },

    /// Get a random OpenVPN config from the local database
    Random {
        #[command(flatten)]
        filter: FilterArgs,

        /// Write the config to this file (or into this directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the OpenVPN config for a host whose name contains the given text
    Show {
        /// Host name, or part of it
        host: String,

        /// Write the config to this file (or into this directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List countries of records stored in the database
    Countries,

    /// Print program version
    Version,
}

/// Country and speed filter flags shared by `list` and `random`.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Show records only with certain country code (repeatable or comma separated)
    #[arg(short = 'c', long = "country", value_delimiter = ',')]
    pub countries: Vec<String>,

    /// Show records only with speed greater than this (Mbps)
    #[arg(short, long)]
    pub speed: Option<u32>,
}

impl FilterArgs {
    /// Converts the flags into a store query filter.
    pub fn to_query_filter(&self) -> QueryFilter {
        let mut filter = QueryFilter::new().with_countries(self.countries.iter());
        if let Some(speed) = self.speed {
            filter = filter.with_min_speed_mbps(speed);
        }
        filter
    }
}

/// Flags for the `list` subcommand.
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Check if servers are online
    #[arg(short = 'p', long)]
    pub ping: bool,

    /// Number of servers checked simultaneously
    #[arg(short = 'w', long, default_value_t = DEFAULT_PROBE_WORKERS)]
    pub ping_workers: usize,

    /// Timeout for a single check (e.g. 500ms, 2s)
    #[arg(short = 't', long, value_parser = humantime::parse_duration, default_value = "500ms")]
    pub ping_timeout: Duration,

    /// TCP port used to check servers
    #[arg(long, default_value_t = DEFAULT_PROBE_PORT)]
    pub port: u16,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl ListArgs {
    /// Builds the probe pool configuration from the flags.
    pub fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            workers: self.ping_workers,
            timeout: self.ping_timeout,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::constants::DEFAULT_PROBE_TIMEOUT;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_no_subcommand_defaults_to_list() {
        let opt = Opt::try_parse_from(["vpnlist", "-c", "jp,kr", "-s", "10", "-p"])
            .expect("top-level list flags should parse");
        match opt.into_command() {
            Command::List(args) => {
                assert!(args.ping);
                assert_eq!(args.filter.countries, vec!["jp", "kr"]);
                assert_eq!(args.filter.speed, Some(10));
                assert_eq!(args.ping_workers, DEFAULT_PROBE_WORKERS);
                assert_eq!(args.ping_timeout, DEFAULT_PROBE_TIMEOUT);
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn test_ping_timeout_accepts_humantime() {
        let opt = Opt::try_parse_from(["vpnlist", "list", "-t", "2s", "-w", "8"])
            .expect("list flags should parse");
        let Command::List(args) = opt.into_command() else {
            panic!("expected list");
        };
        let config = args.probe_config();
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert_eq!(config.workers, 8);
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn test_show_requires_host() {
        assert!(Opt::try_parse_from(["vpnlist", "show"]).is_err());
        let opt = Opt::try_parse_from(["vpnlist", "show", "public-vpn-1"]).expect("should parse");
        match opt.into_command() {
            Command::Show { host, output } => {
                assert_eq!(host, "public-vpn-1");
                assert!(output.is_none());
            }
            other => panic!("expected show, got {other:?}"),
        }
    }

    #[test]
    fn test_global_db_path_after_subcommand() {
        let opt = Opt::try_parse_from(["vpnlist", "countries", "--db-path", "/tmp/x.db"])
            .expect("global flag should parse after subcommand");
        assert_eq!(opt.db_path, Some(PathBuf::from("/tmp/x.db")));
        assert_eq!(opt.resolve_db_path(), Some(PathBuf::from("/tmp/x.db")));
    }

    #[test]
    fn test_list_flag_before_subcommand_is_rejected() {
        let err = Opt::try_parse_args(["vpnlist", "-p", "list", "-c", "jp"])
            .expect_err("-p before list should not be dropped");
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
        assert!(err.to_string().contains("'--ping'"), "{err}");

        let err = Opt::try_parse_args(["vpnlist", "-c", "jp", "random"])
            .expect_err("-c before random should not be dropped");
        assert!(err.to_string().contains("'--country'"), "{err}");
    }

    #[test]
    fn test_global_flags_before_subcommand_still_parse() {
        let opt = Opt::try_parse_args(["vpnlist", "--log-level", "debug", "countries"])
            .expect("global flags are allowed before a subcommand");
        assert!(matches!(opt.log_level, LogLevel::Debug));
        assert!(matches!(opt.into_command(), Command::Countries));

        let opt = Opt::try_parse_args(["vpnlist", "-p", "-c", "jp"])
            .expect("list flags are allowed without a subcommand");
        match opt.into_command() {
            Command::List(args) => {
                assert!(args.ping);
                assert_eq!(args.filter.countries, vec!["jp"]);
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn test_filter_args_to_query_filter() {
        let args = FilterArgs {
            countries: vec!["jp".to_string(), "Us".to_string()],
            speed: Some(10),
        };
        let filter = args.to_query_filter();
        assert_eq!(
            filter.countries().iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["JP", "US"]
        );
        assert_eq!(filter.min_speed_bps(), Some(10_000_000));
    }
}
