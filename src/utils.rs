//! Timing and formatting helpers shared by the benchmarks

use std::time::Duration;

/// Bytes in one megabyte as used by every size setting
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Substituted for a zero elapsed time so throughput stays finite
pub const MIN_ELAPSED_SECS: f64 = 0.001;

/// Convert a duration to seconds, never returning zero
pub fn elapsed_seconds(elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        secs
    } else {
        MIN_ELAPSED_SECS
    }
}

/// Bytes moved by `passes` passes over a `size_mb` file, or `None` on overflow
pub fn checked_bytes(size_mb: u64, passes: u64) -> Option<u64> {
    size_mb.checked_mul(BYTES_PER_MB)?.checked_mul(passes)
}

/// Megabytes per second for `size_mb` moved in `seconds`
pub fn throughput_mbps(size_mb: u64, seconds: f64) -> f64 {
    size_mb as f64 / seconds.max(MIN_ELAPSED_SECS)
}

/// Format a speed as `x.xx MB/s`
pub fn format_speed(size_mb: u64, seconds: f64) -> String {
    format!("{:.2} MB/s", throughput_mbps(size_mb, seconds))
}

/// Format a duration as `HH:MM:SS`
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}
