//! Execution time tracking
//!
//! Wraps a benchmark invocation, measures its wall-clock duration, appends the
//! result to a CSV record store and reports best, worst and average times over
//! the all-time, 30-day and 24-hour windows.

mod record;
mod stats;

pub use record::*;
pub use stats::*;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::Result;

/// Source of the current time
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Outcome of a tracked invocation
///
/// `history` holds the statistics after this run was recorded, or the record
/// store error that prevented it. The invocation's value is kept either way.
#[derive(Debug)]
pub struct TrackedRun<R> {
    pub value: R,
    pub elapsed_seconds: f64,
    pub history: Result<StatisticsReport>,
}

/// Times benchmark invocations and keeps their history
pub struct ExecutionTimeTracker<C: Clock = SystemClock> {
    store: RecordStore,
    clock: C,
}

impl ExecutionTimeTracker<SystemClock> {
    /// Tracker backed by the store at `path`; the file is created on first append
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, SystemClock)
    }
}

impl<C: Clock> ExecutionTimeTracker<C> {
    pub fn with_clock(path: impl Into<PathBuf>, clock: C) -> Self {
        Self {
            store: RecordStore::new(path),
            clock,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Run `invoke`, record how long it took and compute the updated statistics
    ///
    /// A failing invocation is returned as-is and nothing is recorded.
    pub fn track<R, F>(&self, benchmark: &str, invoke: F) -> Result<TrackedRun<R>>
    where
        F: FnOnce() -> Result<R>,
    {
        let start = self.clock.now();
        let value = invoke()?;
        let end = self.clock.now();

        let elapsed_seconds = (end - start).num_milliseconds().max(0) as f64 / 1000.0;
        info!(benchmark, elapsed_secs = elapsed_seconds, "Execution timed");

        let history = self
            .store
            .append(&ExecutionRecord::new(end, benchmark, elapsed_seconds))
            .and_then(|()| self.statistics_at(benchmark, end));

        if let Err(e) = &history {
            warn!(benchmark, error = %e.format_for_log(), "Execution history unavailable");
        }

        Ok(TrackedRun {
            value,
            elapsed_seconds,
            history,
        })
    }

    /// Statistics for `benchmark` as of now
    pub fn statistics(&self, benchmark: &str) -> Result<StatisticsReport> {
        self.statistics_at(benchmark, self.clock.now())
    }

    fn statistics_at(&self, benchmark: &str, now: DateTime<Utc>) -> Result<StatisticsReport> {
        let records = self.store.records_for(benchmark)?;
        debug!(benchmark, records = records.len(), "Computing execution statistics");
        Ok(StatisticsReport::from_records(benchmark, &records, now))
    }
}
