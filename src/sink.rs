//! Rendering of probe outcomes.
//!
//! Sinks see outcomes in the order the pool completes them and must not
//! reorder; each outcome is rendered on its own, independent of the others.

use std::io::{self, Write};

use colored::Colorize;

use crate::probe::{ProbeOutcome, ProbeStatus};

/// Consumer of probe outcomes.
pub trait ResultSink {
    /// Renders one outcome.
    fn render(&mut self, outcome: &ProbeOutcome) -> io::Result<()>;

    /// Called once after the last outcome.
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writes one tab-separated row per outcome, optionally green/red.
pub struct TableSink<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> TableSink<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultSink for TableSink<W> {
    fn render(&mut self, outcome: &ProbeOutcome) -> io::Result<()> {
        let line = format_outcome(outcome);
        if !self.color {
            return writeln!(self.out, "{line}");
        }
        if outcome.is_reachable() {
            writeln!(self.out, "{}", line.green())
        } else {
            writeln!(self.out, "{}", line.red())
        }
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Keeps every outcome in arrival order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    outcomes: Vec<ProbeOutcome>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_outcomes(self) -> Vec<ProbeOutcome> {
        self.outcomes
    }
}

impl ResultSink for CollectingSink {
    fn render(&mut self, outcome: &ProbeOutcome) -> io::Result<()> {
        self.outcomes.push(outcome.clone());
        Ok(())
    }
}

/// Plain (uncolored) row for an outcome.
pub fn format_outcome(outcome: &ProbeOutcome) -> String {
    match &outcome.status {
        ProbeStatus::Reachable { latency } => {
            format!("{}\tonline ({:.1?})", outcome.target, latency)
        }
        ProbeStatus::Unreachable => format!("{}\toffline", outcome.target),
        ProbeStatus::SetupFailed(e) => format!("{}\terror ({e})", outcome.target),
    }
}
