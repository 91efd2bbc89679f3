//! Probe pipeline orchestration.
//!
//! Wires a list of targets into a [`ProbeWorkerPool`] and the pool's results
//! into a [`ResultSink`]. Submission and draining run concurrently in the
//! calling task; the run ends only after the input is closed, every worker
//! has exited, the result channel is empty and the sink is flushed.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::error_handling::{PipelineError, SubmitError};
use crate::probe::{ProbeConfig, ProbeOutcome, ProbeStatus, ProbeWorkerPool, Prober};
use crate::sink::{CollectingSink, ResultSink};
use crate::storage::ProbeTarget;

/// Summary of a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Targets accepted by the pool
    pub submitted: usize,
    /// Outcomes marked reachable
    pub reachable: usize,
    /// Outcomes marked unreachable (including timeouts)
    pub unreachable: usize,
    /// Outcomes whose probe could not be set up
    pub failed: usize,
    /// Whether the run was cut short by cancellation
    pub cancelled: bool,
}

impl PipelineReport {
    /// Number of outcomes that reached the sink.
    pub fn rendered(&self) -> usize {
        self.reachable + self.unreachable + self.failed
    }

    fn tally(&mut self, outcome: &ProbeOutcome) {
        match outcome.status {
            ProbeStatus::Reachable { .. } => self.reachable += 1,
            ProbeStatus::Unreachable => self.unreachable += 1,
            ProbeStatus::SetupFailed(_) => self.failed += 1,
        }
    }
}

/// Probes every target and renders each outcome as it completes.
///
/// Targets are submitted in iteration order; outcomes reach `sink` in
/// completion order. Unless `cancel` fires, every submitted target produces
/// exactly one rendered outcome before this returns.
///
/// A sink write failure does not stop probing: remaining outcomes are drained
/// (so no worker blocks) and the first write error is returned at the end.
///
/// # Errors
///
/// `PipelineError::Config` if `config` is invalid, `PipelineError::Output`
/// if the sink failed to write or flush, `PipelineError::Incomplete` if an
/// uncancelled run lost targets (a worker died).
pub async fn run_probe_pipeline<P, S, I>(
    targets: I,
    config: &ProbeConfig,
    prober: Arc<P>,
    sink: &mut S,
    cancel: CancellationToken,
) -> Result<PipelineReport, PipelineError>
where
    P: Prober + 'static,
    S: ResultSink + ?Sized,
    I: IntoIterator<Item = ProbeTarget>,
{
    let (pool, mut results) = ProbeWorkerPool::spawn(config, prober, cancel.clone())?;

    let submit = async move {
        let mut submitted = 0;
        let mut cancelled = false;
        let mut closed_early = false;
        for target in targets {
            match pool.submit(target).await {
                Ok(()) => submitted += 1,
                Err(SubmitError::Cancelled) => {
                    cancelled = true;
                    break;
                }
                Err(SubmitError::Closed) => {
                    warn!("Probe pool closed early after {submitted} target(s)");
                    closed_early = true;
                    break;
                }
            }
        }
        // Phase one: close input and wait for workers. Their senders drop as they exit.
        let produced = pool.finish().await;
        (submitted, produced, cancelled, closed_early)
    };

    let drain = async {
        let mut report = PipelineReport::default();
        let mut write_error = None;
        // Phase two: runs until the last worker's sender is gone.
        while let Some(outcome) = results.recv().await {
            report.tally(&outcome);
            if write_error.is_none() {
                if let Err(e) = sink.render(&outcome) {
                    warn!("Failed to render probe result, still draining: {e}");
                    write_error = Some(e);
                }
            }
        }
        let flushed = sink.finish();
        (report, write_error.map_or(flushed, Err))
    };

    let ((submitted, produced, cancelled, closed_early), (mut report, written)) =
        tokio::join!(submit, drain);
    // Cancellation after the last submit still stops workers early
    let cancelled = cancelled || cancel.is_cancelled();
    report.submitted = submitted;
    report.cancelled = cancelled;

    if produced != report.rendered() {
        warn!(
            "Workers produced {produced} outcome(s) but {} were drained",
            report.rendered()
        );
    }
    if cancelled {
        info!(
            "Probing cancelled: {} of {submitted} submitted target(s) checked",
            report.rendered()
        );
    } else {
        debug!(
            "Probed {submitted} target(s): {} reachable, {} unreachable, {} failed",
            report.reachable, report.unreachable, report.failed
        );
    }

    written?;
    if !cancelled && (report.rendered() != submitted || closed_early) {
        return Err(PipelineError::Incomplete {
            submitted,
            rendered: report.rendered(),
        });
    }
    Ok(report)
}

/// Probes every target and returns the outcomes in completion order.
pub async fn probe_all<P>(
    targets: Vec<ProbeTarget>,
    config: &ProbeConfig,
    prober: Arc<P>,
) -> Result<Vec<ProbeOutcome>, PipelineError>
where
    P: Prober + 'static,
{
    let mut sink = CollectingSink::new();
    run_probe_pipeline(targets, config, prober, &mut sink, CancellationToken::new()).await?;
    Ok(sink.into_outcomes())
}
