//! vpnlist command-line entry point.
//!
//! Thin wrapper around the `vpnlist` library: loads `.env`, parses flags,
//! sets up logging, opens the catalog and runs the requested subcommand.

use std::io::{self, IsTerminal, Write};
use std::process;

use anyhow::{Context, Result};

use vpnlist::app::commands::version;
use vpnlist::app::{cancel_on_ctrl_c, run_command, RunContext};
use vpnlist::initialization::init_logger_with;
use vpnlist::{Command, Opt, RecordStore};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("vpnlist error: {:#}", e);
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    // VPNLIST_DB_PATH may come from a .env file next to the working directory
    let _ = dotenvy::dotenv();

    let opt = Opt::parse_args();
    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;

    let db_path = opt.resolve_db_path();
    let command = opt.into_command();
    let stdout = io::stdout();

    // Version needs no database
    if matches!(command, Command::Version) {
        return version(&mut stdout.lock());
    }

    let db_path = db_path
        .context("can not determine the user config directory; pass --db-path")?;
    let store = RecordStore::open(&db_path)
        .await
        .with_context(|| format!("can not open database {}", db_path.display()))?;

    let ctx = RunContext {
        color: stdout.is_terminal(),
        cancel: cancel_on_ctrl_c(),
    };
    let mut out = stdout.lock();
    run_command(command, &store, &ctx, &mut out).await?;
    out.flush()?;
    Ok(())
}
