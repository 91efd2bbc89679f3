//! Subcommand handlers.
//!
//! Handlers write user-facing output to `out` and return `anyhow` errors with
//! context; `main` decides how to report them.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use tokio_util::sync::CancellationToken;

use crate::config::{Command, FilterArgs, ListArgs};
use crate::feed::download_records;
use crate::initialization::init_client;
use crate::pipeline::run_probe_pipeline;
use crate::probe::TcpProber;
use crate::sink::TableSink;
use crate::storage::{ProbeTarget, RecordStore, ServerConfig};

use super::output::{save_config, write_config};

const EMPTY_CATALOG_HINT: &str = "There are no server records in the local database yet.\n\
                                  To populate the database, run 'vpnlist update'.";

/// Terminal-dependent settings for a run.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    /// Whether stdout can show colors
    pub color: bool,
    /// Stops probing early (Ctrl-C)
    pub cancel: CancellationToken,
}

/// Runs one subcommand against `store`.
pub async fn run_command<W: Write>(
    command: Command,
    store: &RecordStore,
    ctx: &RunContext,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::List(args) => list(store, &args, ctx, out).await,
        Command::Update { url } => {
            let client = init_client().context("Failed to initialize HTTP client")?;
            update(store, &client, &url, out).await
        }
        Command::Random { filter, output } => random(store, &filter, output.as_deref(), out).await,
        Command::Show { host, output } => show(store, &host, output.as_deref(), out).await,
        Command::Countries => countries(store, out).await,
        Command::Version => version(out),
    }
}

/// Prints matching servers, optionally checking each one.
pub async fn list<W: Write>(
    store: &RecordStore,
    args: &ListArgs,
    ctx: &RunContext,
    out: &mut W,
) -> Result<()> {
    let filter = args.filter.to_query_filter();
    let targets = store
        .query_filtered(&filter)
        .await
        .context("can not retrieve records")?;

    if targets.is_empty() {
        if store.count().await.context("can not count records")? == 0 {
            writeln!(out, "{EMPTY_CATALOG_HINT}")?;
        } else {
            writeln!(out, "No servers match [{filter}].")?;
        }
        return Ok(());
    }

    writeln!(out, "{}", ProbeTarget::header())?;
    if !args.ping {
        for target in &targets {
            writeln!(out, "{target}")?;
        }
        return Ok(());
    }

    let color = ctx.color && !args.no_color;
    let prober = Arc::new(TcpProber::new(args.port));
    let mut sink = TableSink::new(&mut *out, color);
    let report = run_probe_pipeline(
        targets,
        &args.probe_config(),
        prober,
        &mut sink,
        ctx.cancel.clone(),
    )
    .await
    .context("server check failed")?;

    info!(
        "{} of {} server(s) online",
        report.reachable, report.submitted
    );
    Ok(())
}

/// Downloads the feed and merges it into the catalog.
pub async fn update<W: Write>(
    store: &RecordStore,
    client: &reqwest::Client,
    url: &str,
    out: &mut W,
) -> Result<()> {
    let batch = download_records(client, url)
        .await
        .with_context(|| format!("can not download vpn list from {url}"))?;
    let saved = store
        .upsert_all(&batch.records)
        .await
        .context("can not save records")?;
    let total = store.count().await.context("can not count records")?;

    writeln!(
        out,
        "Got servers: {saved}, total servers in the database: {total}."
    )?;
    Ok(())
}

/// Prints or saves one random matching configuration.
pub async fn random<W: Write>(
    store: &RecordStore,
    filter: &FilterArgs,
    output: Option<&Path>,
    out: &mut W,
) -> Result<()> {
    let config = store
        .query_random(&filter.to_query_filter())
        .await
        .context("can not retrieve config")?;
    emit_config(&config, output, out)
}

/// Prints or saves the configuration of a host matching `host`.
pub async fn show<W: Write>(
    store: &RecordStore,
    host: &str,
    output: Option<&Path>,
    out: &mut W,
) -> Result<()> {
    let config = store
        .query_specific(host)
        .await
        .context("can not retrieve config")?;
    emit_config(&config, output, out)
}

/// Prints every stored country label.
pub async fn countries<W: Write>(store: &RecordStore, out: &mut W) -> Result<()> {
    let countries = store
        .distinct_countries()
        .await
        .context("can not retrieve countries")?;
    for country in countries {
        writeln!(out, "{country}")?;
    }
    Ok(())
}

pub fn version<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "vpnlist {}", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}

fn emit_config<W: Write>(config: &ServerConfig, output: Option<&Path>, out: &mut W) -> Result<()> {
    match output {
        None => write_config(config, out)?,
        Some(path) => {
            let written = save_config(config, path)
                .with_context(|| format!("can not write config to {}", path.display()))?;
            writeln!(out, "Saved {} to {}", config.fqdn(), written.display())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_helpers::{create_test_store, test_record};

    fn list_args() -> ListArgs {
        use clap::Parser;
        match crate::config::Opt::parse_from(["vpnlist"]).into_command() {
            Command::List(args) => args,
            _ => unreachable!(),
        }
    }

    fn text(out: Vec<u8>) -> String {
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_list_empty_catalog_prints_hint() {
        let store = create_test_store().await;
        let mut out = Vec::new();
        list(&store, &list_args(), &RunContext::default(), &mut out)
            .await
            .unwrap();
        assert!(text(out).contains("run 'vpnlist update'"));
    }

    #[tokio::test]
    async fn test_list_prints_header_and_sorted_rows() {
        let store = create_test_store().await;
        store.upsert(&test_record("us-1", "US", 50_000_000)).await.unwrap();
        store.upsert(&test_record("jp-1", "JP", 20_000_000)).await.unwrap();

        let mut out = Vec::new();
        list(&store, &list_args(), &RunContext::default(), &mut out)
            .await
            .unwrap();
        let text = text(out);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], ProbeTarget::header());
        assert!(lines[1].starts_with("JP") && lines[1].contains("jp-1"));
        assert!(lines[2].starts_with("US") && lines[2].ends_with("50.00   Mbps"));
    }

    #[tokio::test]
    async fn test_list_with_filter_and_no_match() {
        let store = create_test_store().await;
        store.upsert(&test_record("jp-1", "JP", 20_000_000)).await.unwrap();

        let mut args = list_args();
        args.filter.countries = vec!["kr".to_string()];
        let mut out = Vec::new();
        list(&store, &args, &RunContext::default(), &mut out)
            .await
            .unwrap();
        assert_eq!(text(out), "No servers match [country in KR].\n");
    }

    #[tokio::test]
    async fn test_show_prints_config_block() {
        let store = create_test_store().await;
        store.upsert(&test_record("public-vpn-42", "JP", 1)).await.unwrap();

        let mut out = Vec::new();
        show(&store, "vpn-42", None, &mut out).await.unwrap();
        let text = text(out);
        assert!(text.starts_with(
            "# HOST: public-vpn-42.opengw.net\n# IP: 192.0.2.1\n# COUNTRY: Japan\n"
        ));
        assert!(text.ends_with("client\n# public-vpn-42\n"));
    }

    #[tokio::test]
    async fn test_show_missing_host_is_error() {
        let store = create_test_store().await;
        let mut out = Vec::new();
        let err = show(&store, "nope", None, &mut out).await.unwrap_err();
        assert!(format!("{err:#}").contains("no server found matching host 'nope'"));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_random_respects_filter() {
        let store = create_test_store().await;
        store.upsert(&test_record("jp-1", "JP", 1)).await.unwrap();
        store.upsert(&test_record("us-1", "US", 1)).await.unwrap();

        let filter = FilterArgs {
            countries: vec!["us".to_string()],
            speed: None,
        };
        for _ in 0..5 {
            let mut out = Vec::new();
            random(&store, &filter, None, &mut out).await.unwrap();
            assert!(text(out).starts_with("# HOST: us-1.opengw.net"));
        }
    }

    #[tokio::test]
    async fn test_countries_one_per_line() {
        let store = create_test_store().await;
        store.upsert(&test_record("us-1", "US", 1)).await.unwrap();
        store.upsert(&test_record("jp-1", "JP", 1)).await.unwrap();
        store.upsert(&test_record("jp-2", "JP", 1)).await.unwrap();

        let mut out = Vec::new();
        countries(&store, &mut out).await.unwrap();
        assert_eq!(text(out), "Japan (JP)\nUnited States (US)\n");
    }

    #[test]
    fn test_version_line() {
        let mut out = Vec::new();
        version(&mut out).unwrap();
        assert_eq!(text(out), format!("vpnlist {}\n", env!("CARGO_PKG_VERSION")));
    }
}
