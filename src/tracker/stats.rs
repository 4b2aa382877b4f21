//! Rolling statistics over execution records

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::record::ExecutionRecord;

/// Best, worst and mean execution time over a set of records
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Statistics {
    pub best: f64,
    pub worst: f64,
    pub average: f64,
    pub count: usize,
}

impl Statistics {
    /// `None` when there are no samples
    pub fn from_samples(samples: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut best = f64::INFINITY;
        let mut worst = f64::NEG_INFINITY;

        for sample in samples {
            count += 1;
            sum += sample;
            best = best.min(sample);
            worst = worst.max(sample);
        }

        (count > 0).then(|| Self {
            best,
            worst,
            average: sum / count as f64,
            count,
        })
    }
}

/// Trailing time window used to filter records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    AllTime,
    Last30Days,
    Last24Hours,
}

impl Window {
    /// Every window, in display order
    pub const ALL: [Window; 3] = [Window::AllTime, Window::Last30Days, Window::Last24Hours];

    /// Length of the window, `None` for all-time
    pub fn span(&self) -> Option<Duration> {
        match self {
            Window::AllTime => None,
            Window::Last30Days => Some(Duration::days(30)),
            Window::Last24Hours => Some(Duration::hours(24)),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Window::AllTime => "All-time",
            Window::Last30Days => "Last 30 days",
            Window::Last24Hours => "Last 24 hours",
        }
    }

    /// Whether `timestamp` falls inside the window ending at `now`; the boundary is included
    pub fn contains(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self.span() {
            None => true,
            Some(span) => timestamp >= now - span,
        }
    }
}

/// Statistics for one non-empty window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowStatistics {
    pub window: Window,
    pub stats: Statistics,
}

/// Statistics for every non-empty window of one benchmark
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsReport {
    pub benchmark: String,
    pub windows: Vec<WindowStatistics>,
}

impl StatisticsReport {
    /// Filter `records` into each window ending at `now`; empty windows are left out
    pub fn from_records(benchmark: &str, records: &[ExecutionRecord], now: DateTime<Utc>) -> Self {
        let windows = Window::ALL
            .iter()
            .filter_map(|&window| {
                let samples = records
                    .iter()
                    .filter(|r| window.contains(r.timestamp, now))
                    .map(|r| r.elapsed_seconds);
                Statistics::from_samples(samples).map(|stats| WindowStatistics { window, stats })
            })
            .collect();

        Self {
            benchmark: benchmark.to_string(),
            windows,
        }
    }

    pub fn get(&self, window: Window) -> Option<&Statistics> {
        self.windows
            .iter()
            .find(|w| w.window == window)
            .map(|w| &w.stats)
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}
