// src/summary.rs
// Waits for the ledger to fill up, then reports.

use std::fmt;
use std::time::Duration;

use tokio::time::{sleep, Instant};

use crate::config::options::SummaryOptions;
use crate::store::{Ledger, LedgerSource};

#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub expected: usize,
    /// Sorted.
    pub passed: Vec<String>,
    /// Sorted.
    pub failed: Vec<String>,
    /// True when the wait ended before all expected outcomes arrived.
    pub timed_out: bool,
    pub waited: Duration,
}

impl Report {
    pub fn from_ledger(expected: usize, ledger: Ledger, timed_out: bool, waited: Duration) -> Self {
        let Ledger { mut passed, mut failed, .. } = ledger;
        passed.sort();
        failed.sort();
        Self { expected, passed, failed, timed_out, waited }
    }

    pub fn recorded(&self) -> usize {
        self.passed.len() + self.failed.len()
    }

    /// Soft check: at least `min_ratio` of the expected outcomes were recorded.
    pub fn is_healthy(&self, min_ratio: f64) -> bool {
        self.recorded() as f64 >= self.expected as f64 * min_ratio
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n===== TEST RESULTS SUMMARY =====")?;
        writeln!(f, "Total players tested: {}", self.expected)?;
        write!(f, "Results recorded: {}", self.recorded())?;
        if self.timed_out {
            write!(f, " (stopped waiting after {}s)", self.waited.as_secs())?;
        }
        writeln!(f)?;
        writeln!(f, "Passed: {} | Failed: {}", self.passed.len(), self.failed.len())?;

        if !self.passed.is_empty() {
            writeln!(f, "\n✅ Players that met criteria:")?;
            for (i, name) in self.passed.iter().enumerate() {
                writeln!(f, "   {}. {name}", i + 1)?;
            }
        }
        if !self.failed.is_empty() {
            writeln!(f, "\n❌ Players that failed to meet criteria:")?;
            for (i, name) in self.failed.iter().enumerate() {
                writeln!(f, "   {}. {name}", i + 1)?;
            }
        }
        writeln!(f, "\n================================")
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SummaryReporter {
    interval: Duration,
    max_wait: Duration,
}

impl SummaryReporter {
    pub fn new(opts: &SummaryOptions) -> Self {
        Self { interval: opts.interval, max_wait: opts.max_wait }
    }

    /// Poll until `expected` outcomes are recorded or `max_wait` passes.
    /// Partial results are reported on timeout.
    pub async fn wait_for<S>(&self, source: &S, expected: usize) -> Report
    where
        S: LedgerSource + ?Sized,
    {
        let start = Instant::now();
        let deadline = start + self.max_wait;
        loop {
            let ledger = source.read();
            let recorded = ledger.recorded();
            if recorded >= expected {
                return Report::from_ledger(expected, ledger, false, start.elapsed());
            }

            let now = Instant::now();
            if now >= deadline {
                logf!("summary: {recorded}/{expected} results after {}s, reporting partial", self.max_wait.as_secs());
                return Report::from_ledger(expected, ledger, true, start.elapsed());
            }
            logd!("summary: {recorded}/{expected} results, waiting");
            sleep(self.interval.min(deadline - now)).await;
        }
    }
}
