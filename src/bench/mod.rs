//! Benchmark workloads
//!
//! Provides:
//! - CPU benchmark (naive primality sweep)
//! - Disk I/O benchmark (chunked sequential write and multi-pass read)
//! - The progress callback both of them report through

mod cpu;
mod io;
mod progress;

pub use cpu::*;
pub use io::*;
pub use progress::*;

use serde::Serialize;

/// Name under which CPU runs are recorded in the execution history
pub const CPU_BENCHMARK_NAME: &str = "benchmark:cpu";

/// Name under which I/O runs are recorded in the execution history
pub const IO_BENCHMARK_NAME: &str = "benchmark:io";

/// Host description saved alongside JSON results
#[derive(Debug, Clone, Serialize)]
pub struct HostInfo {
    pub hostname: String,
    pub os: String,
    pub arch: String,
    pub cpu_count: usize,
}

impl HostInfo {
    /// Collect information about the current host
    pub fn collect() -> Self {
        Self {
            hostname: hostname::get()
                .ok()
                .and_then(|h| h.into_string().ok())
                .unwrap_or_else(|| "unknown".to_string()),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            cpu_count: num_cpus::get(),
        }
    }
}
