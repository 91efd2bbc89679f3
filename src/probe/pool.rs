//! Bounded fan-out of probe workers.
//!
//! `W` worker tasks share one bounded work queue and write into one bounded
//! result queue. Producers wait when the work queue is full and workers wait
//! when the result queue is full, so memory stays bounded no matter how slow
//! the consumer is.
//!
//! Shutdown is two-phase: [`ProbeWorkerPool::finish`] closes the work queue and
//! waits for every worker; the result channel closes when the last worker drops
//! its sender. `finish` must run concurrently with draining the result
//! receiver, otherwise workers block on a full result queue.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use log::{debug, error, warn};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error_handling::{ProbeConfigError, ProbeSetupError, SubmitError};
use crate::storage::ProbeTarget;

use super::prober::Prober;
use super::types::{ProbeConfig, ProbeOutcome, ProbeStatus};

type WorkQueue = Arc<Mutex<mpsc::Receiver<ProbeTarget>>>;

/// Submission side of a running set of probe workers.
pub struct ProbeWorkerPool {
    input: mpsc::Sender<ProbeTarget>,
    workers: JoinSet<usize>,
    cancel: CancellationToken,
}

impl ProbeWorkerPool {
    /// Spawns `config.workers` workers and returns the pool with its result receiver.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `ProbeConfigError` if the configuration is unusable; nothing is
    /// spawned in that case.
    pub fn spawn<P>(
        config: &ProbeConfig,
        prober: Arc<P>,
        cancel: CancellationToken,
    ) -> Result<(Self, mpsc::Receiver<ProbeOutcome>), ProbeConfigError>
    where
        P: Prober + 'static,
    {
        config.validate()?;

        let (input_tx, input_rx) = mpsc::channel(config.queue_capacity);
        let (output_tx, output_rx) = mpsc::channel(config.queue_capacity);
        let queue: WorkQueue = Arc::new(Mutex::new(input_rx));

        let mut workers = JoinSet::new();
        for id in 0..config.workers {
            workers.spawn(run_worker(
                id,
                Arc::clone(&queue),
                output_tx.clone(),
                Arc::clone(&prober),
                config.timeout,
                cancel.clone(),
            ));
        }
        debug!(
            "Started {} probe worker(s), timeout {:?}, queue capacity {}",
            config.workers, config.timeout, config.queue_capacity
        );

        Ok((
            Self {
                input: input_tx,
                workers,
                cancel,
            },
            output_rx,
        ))
    }

    /// Queues one target, waiting for a free slot if the queue is full.
    pub async fn submit(&self, target: ProbeTarget) -> Result<(), SubmitError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(SubmitError::Cancelled),
            sent = self.input.send(target) => sent.map_err(|_| SubmitError::Closed),
        }
    }

    /// Signals end of input and waits for every worker to exit.
    ///
    /// Returns the number of outcomes the workers produced.
    pub async fn finish(self) -> usize {
        let Self {
            input, mut workers, ..
        } = self;
        drop(input);

        let mut produced = 0;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(count) => produced += count,
                Err(e) => error!("Probe worker terminated abnormally: {e}"),
            }
        }
        debug!("All probe workers finished, {produced} outcome(s) produced");
        produced
    }
}

async fn run_worker<P: Prober>(
    id: usize,
    queue: WorkQueue,
    results: mpsc::Sender<ProbeOutcome>,
    prober: Arc<P>,
    timeout: Duration,
    cancel: CancellationToken,
) -> usize {
    let mut produced = 0;
    loop {
        // The lock is only held while waiting for the next target, never while probing.
        let next = {
            let mut queue = queue.lock().await;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                target = queue.recv() => target,
            }
        };
        let Some(target) = next else {
            break;
        };

        let status = probe_target(prober.as_ref(), &target, timeout).await;
        if results.send(ProbeOutcome { target, status }).await.is_err() {
            warn!("Probe worker {id}: result receiver dropped, stopping");
            break;
        }
        produced += 1;
    }
    debug!("Probe worker {id} exiting after {produced} probe(s)");
    produced
}

/// Runs one bounded attempt. A panicking prober fails only this target.
async fn probe_target<P: Prober>(
    prober: &P,
    target: &ProbeTarget,
    timeout: Duration,
) -> ProbeStatus {
    let attempt = AssertUnwindSafe(prober.probe(&target.ip, timeout)).catch_unwind();
    match tokio::time::timeout(timeout, attempt).await {
        Ok(Ok(Ok(reachability))) if reachability.reachable => ProbeStatus::Reachable {
            latency: reachability.latency,
        },
        Ok(Ok(Ok(_))) | Err(_) => ProbeStatus::Unreachable,
        Ok(Ok(Err(e))) => {
            warn!("Cannot probe {} ({}): {e}", target.host_name, target.ip);
            ProbeStatus::SetupFailed(e)
        }
        Ok(Err(payload)) => {
            let message = panic_message(payload.as_ref());
            error!(
                "Probe of {} ({}) panicked: {message}",
                target.host_name, target.ip
            );
            ProbeStatus::SetupFailed(ProbeSetupError::Panicked(message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
