//! Terminal rendering and result files
//!
//! Benchmarks report through the `Progress` trait and return plain result
//! structs. This module turns those into progress bars, summaries and boxed
//! tables on stdout, and into JSON when `--output` is given.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;

use crate::bench::{CpuBenchmarkResult, HostInfo, IoBenchmarkResult, Progress};
use crate::error::{Error, Result};
use crate::tracker::StatisticsReport;
use crate::utils;

const BAR_TEMPLATE: &str =
    "{spinner:.green} {msg:<16} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent:>3}% {eta}";

/// Inner width of boxed tables, excluding the border characters
const TABLE_WIDTH: usize = 50;

// ─────────────────────────────────────────────────────────────────
// Progress
// ─────────────────────────────────────────────────────────────────

/// indicatif progress bar on stderr, one bar per phase
pub struct ConsoleProgress {
    bar: Option<ProgressBar>,
    hidden: bool,
}

impl ConsoleProgress {
    /// A hidden renderer swallows every update, used with `--quiet`
    pub fn new(hidden: bool) -> Self {
        Self { bar: None, hidden }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
    }
}

impl Progress for ConsoleProgress {
    fn start(&mut self, label: &str, len: u64) {
        if let Some(previous) = self.bar.take() {
            previous.finish_and_clear();
        }

        let bar = if self.hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(len)
        };
        bar.set_style(Self::style());
        bar.set_message(label.to_string());
        self.bar = Some(bar);
    }

    fn set_position(&mut self, pos: u64) {
        if let Some(bar) = &self.bar {
            bar.set_position(pos);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }
    }
}

impl Drop for ConsoleProgress {
    fn drop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.abandon();
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Summaries
// ─────────────────────────────────────────────────────────────────

/// Lines printed after the CPU sweep
pub fn cpu_summary(result: &CpuBenchmarkResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("Found {} primes\n", result.primes_found));
    match result.last_prime {
        Some(prime) => out.push_str(&format!("Last prime found was {}\n", prime)),
        None => out.push_str("No primes found\n"),
    }
    out.push_str(&format!(
        "CPU test completed in {} ({:.2}s)\n",
        utils::format_duration(result.elapsed_seconds),
        result.elapsed_seconds
    ));
    out
}

/// Write and read phase lines followed by the I/O performance summary
pub fn io_summary(result: &IoBenchmarkResult) -> String {
    let write = &result.write;
    let read = &result.read;
    let mut out = String::new();

    out.push_str(&format!(
        "Wrote {} MB in {} ({})\n",
        write.size_mb,
        utils::format_duration(write.elapsed_seconds),
        utils::format_speed(write.size_mb, write.elapsed_seconds)
    ));

    for (i, secs) in read.pass_seconds.iter().enumerate() {
        out.push_str(&format!(
            "Read iteration {}/{}: {} MB in {} ({})\n",
            i + 1,
            read.iterations,
            read.size_mb,
            utils::format_duration(*secs),
            utils::format_speed(read.size_mb, *secs)
        ));
    }

    out.push_str(&format!(
        "Read {} MB x {} in {}\n",
        read.size_mb,
        read.iterations,
        utils::format_duration(read.elapsed_seconds)
    ));

    out.push('\n');
    out.push_str("I/O Performance Summary\n");
    out.push_str(&format!("  Write speed:    {:.2} MB/s\n", write.throughput_mbps));
    out.push_str(&format!("  Read speed:     {:.2} MB/s\n", read.throughput_mbps));
    out.push_str(&format!("  Combined speed: {:.2} MB/s\n", result.combined_mbps));
    out.push_str(&format!(
        "  Total time:     {}\n",
        utils::format_duration(result.total_elapsed_seconds)
    ));
    out
}

// ─────────────────────────────────────────────────────────────────
// Tables
// ─────────────────────────────────────────────────────────────────

/// Draw a double-line box with a title row and right-aligned values
fn boxed(title: &str, rows: &[(String, String)]) -> String {
    let border = "═".repeat(TABLE_WIDTH + 2);
    let mut out = String::new();

    out.push_str(&format!("╔{}╗\n", border));
    out.push_str(&format!("║ {:<width$} ║\n", title, width = TABLE_WIDTH));
    out.push_str(&format!("╠{}╣\n", border));
    for (label, value) in rows {
        let pad = TABLE_WIDTH.saturating_sub(label.chars().count());
        out.push_str(&format!("║ {}{:>pad$} ║\n", label, value, pad = pad));
    }
    out.push_str(&format!("╚{}╝\n", border));
    out
}

fn seconds(value: f64) -> String {
    format!("{:.2}s", value)
}

/// Table showing how long the current run took
pub fn execution_time_table(benchmark: &str, elapsed_seconds: f64) -> String {
    boxed(
        "Execution time",
        &[
            (benchmark.to_string(), seconds(elapsed_seconds)),
            (
                "Duration".to_string(),
                utils::format_duration(elapsed_seconds),
            ),
        ],
    )
}

/// One table per non-empty window
pub fn statistics_tables(report: &StatisticsReport) -> String {
    if report.is_empty() {
        return format!("No execution history for {}\n", report.benchmark);
    }

    report
        .windows
        .iter()
        .map(|w| {
            let title = format!("{} statistics: {}", w.window.label(), report.benchmark);
            boxed(
                &title,
                &[
                    ("Best".to_string(), seconds(w.stats.best)),
                    ("Worst".to_string(), seconds(w.stats.worst)),
                    ("Average".to_string(), seconds(w.stats.average)),
                    ("Runs".to_string(), w.stats.count.to_string()),
                ],
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ─────────────────────────────────────────────────────────────────
// JSON Results
// ─────────────────────────────────────────────────────────────────

/// A run as written by `--output`
#[derive(Debug, Serialize)]
pub struct SavedRun<'a, T: Serialize> {
    pub benchmark: &'a str,
    pub completed_at: DateTime<Utc>,
    pub host: HostInfo,
    pub result: &'a T,
    /// Tracked wall-clock time, absent with `--no-track`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracked_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<&'a StatisticsReport>,
}

impl<'a, T: Serialize> SavedRun<'a, T> {
    pub fn new(benchmark: &'a str, result: &'a T) -> Self {
        Self {
            benchmark,
            completed_at: Utc::now(),
            host: HostInfo::collect(),
            result,
            tracked_seconds: None,
            statistics: None,
        }
    }
}

/// Save a run as pretty JSON, creating parent directories
pub fn save_results<T: Serialize>(run: &SavedRun<'_, T>, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io_write(parent, e))?;
    }

    let json = serde_json::to_string_pretty(run)?;
    fs::write(path, json).map_err(|e| Error::io_write(path, e))?;

    info!(path = %path.display(), "Benchmark results saved");
    Ok(())
}
