//! Disk I/O benchmark
//!
//! Writes a file of the configured size in fixed-size chunks, reads it back
//! a configured number of times, then removes it. Each phase is timed with
//! a monotonic clock and reported as MB/s.

use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::progress::Progress;
use crate::config::IoSettings;
use crate::error::{Error, Result};
use crate::utils;

/// Byte used to fill the write buffer; content does not affect the measurement
const FILL_BYTE: u8 = b'A';

// ─────────────────────────────────────────────────────────────────
// Results
// ─────────────────────────────────────────────────────────────────

/// Result of a write or read test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoTestResult {
    /// Configured file size in MB
    pub size_mb: u64,

    /// Bytes actually written or read across all passes
    pub bytes_transferred: u64,

    /// Throughput computed from the configured size
    pub throughput_mbps: f64,

    /// Wall-clock duration of the whole test
    pub elapsed_seconds: f64,

    /// Number of passes (always 1 for the write test)
    pub iterations: u32,

    /// Duration of each pass
    pub pass_seconds: Vec<f64>,
}

/// Combined write + read results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoBenchmarkResult {
    pub write: IoTestResult,
    pub read: IoTestResult,

    /// All MB moved by the write and read passes over the total elapsed time
    pub combined_mbps: f64,

    /// From temp file creation through cleanup
    pub total_elapsed_seconds: f64,

    /// Location of the (now removed) test file
    pub temp_path: PathBuf,
}

// ─────────────────────────────────────────────────────────────────
// Write Test
// ─────────────────────────────────────────────────────────────────

/// Sequential chunked write test
pub struct IoWriteBenchmark {
    size_mb: u64,
    chunk_size: usize,
}

impl IoWriteBenchmark {
    pub fn new(size_mb: u64, chunk_size: usize) -> Self {
        Self { size_mb, chunk_size }
    }

    /// Write `size_mb` megabytes to `path`, truncating existing content
    ///
    /// The last chunk is written whole, so the file may exceed the target
    /// size by up to `chunk_size - 1` bytes.
    pub fn run(&self, path: &Path, progress: &mut dyn Progress) -> Result<IoTestResult> {
        info!(path = %path.display(), size_mb = self.size_mb, "Starting write test");

        let target = transfer_bytes(self.size_mb, 1)?;
        let chunk = vec![FILL_BYTE; self.chunk_size];
        let mut written = 0u64;

        let start = Instant::now();
        {
            let mut file = File::create(path).map_err(|e| Error::io_write(path, e))?;

            progress.start("Writing", target);
            while written < target {
                file.write_all(&chunk).map_err(|e| Error::io_write(path, e))?;
                written += chunk.len() as u64;
                progress.set_position(written.min(target));
            }
            file.flush().map_err(|e| Error::io_write(path, e))?;
        }
        let elapsed_seconds = utils::elapsed_seconds(start.elapsed());
        progress.finish();

        let result = IoTestResult {
            size_mb: self.size_mb,
            bytes_transferred: written,
            throughput_mbps: utils::throughput_mbps(self.size_mb, elapsed_seconds),
            elapsed_seconds,
            iterations: 1,
            pass_seconds: vec![elapsed_seconds],
        };

        info!(
            bytes = written,
            elapsed_secs = elapsed_seconds,
            mbps = result.throughput_mbps,
            "Write test complete"
        );
        Ok(result)
    }
}

// ─────────────────────────────────────────────────────────────────
// Read Test
// ─────────────────────────────────────────────────────────────────

/// Sequential chunked read test, repeated over several passes
pub struct IoReadBenchmark {
    size_mb: u64,
    chunk_size: usize,
    iterations: u32,
}

impl IoReadBenchmark {
    pub fn new(size_mb: u64, chunk_size: usize, iterations: u32) -> Self {
        Self {
            size_mb,
            chunk_size,
            iterations,
        }
    }

    /// Read `path` to the end `iterations` times
    ///
    /// Throughput assumes the file is exactly `size_mb`; the observed size is
    /// only reported in `bytes_transferred`.
    pub fn run(&self, path: &Path, progress: &mut dyn Progress) -> Result<IoTestResult> {
        info!(
            path = %path.display(),
            size_mb = self.size_mb,
            iterations = self.iterations,
            "Starting read test"
        );

        transfer_bytes(self.size_mb, u64::from(self.iterations))?;
        let expected = transfer_bytes(self.size_mb, 1)?;
        let mut buffer = vec![0u8; self.chunk_size];
        let mut total_read = 0u64;
        let mut pass_seconds = Vec::with_capacity(self.iterations as usize);

        let start = Instant::now();
        for pass in 1..=self.iterations {
            let pass_start = Instant::now();
            let mut file = File::open(path).map_err(|e| Error::io_read(path, e))?;
            let mut pass_read = 0u64;

            progress.start(&format!("Read pass {}/{}", pass, self.iterations), expected);
            loop {
                let n = match file.read(&mut buffer) {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return Err(Error::io_read(path, e)),
                };
                pass_read += n as u64;
                progress.set_position(pass_read.min(expected));
            }
            progress.finish();

            let secs = utils::elapsed_seconds(pass_start.elapsed());
            debug!(pass, bytes = pass_read, elapsed_secs = secs, "Read pass complete");
            pass_seconds.push(secs);
            total_read += pass_read;
        }
        let elapsed_seconds = utils::elapsed_seconds(start.elapsed());

        let total_mb = self.size_mb * u64::from(self.iterations);
        let result = IoTestResult {
            size_mb: self.size_mb,
            bytes_transferred: total_read,
            throughput_mbps: utils::throughput_mbps(total_mb, elapsed_seconds),
            elapsed_seconds,
            iterations: self.iterations,
            pass_seconds,
        };

        info!(
            bytes = total_read,
            elapsed_secs = elapsed_seconds,
            mbps = result.throughput_mbps,
            "Read test complete"
        );
        Ok(result)
    }
}

// ─────────────────────────────────────────────────────────────────
// Orchestrator
// ─────────────────────────────────────────────────────────────────

/// Runs write then read against a temporary file and cleans it up
pub struct IoBenchmark {
    size_mb: u64,
    chunk_size: usize,
    read_iterations: u32,
    temp_dir: PathBuf,
}

impl IoBenchmark {
    /// Create a benchmark using the platform temp directory
    pub fn new(size_mb: u64, chunk_size: usize, read_iterations: u32) -> Self {
        Self {
            size_mb,
            chunk_size,
            read_iterations,
            temp_dir: std::env::temp_dir(),
        }
    }

    /// Create a benchmark from configuration
    pub fn from_settings(settings: &IoSettings, temp_dir: PathBuf) -> Self {
        Self::new(settings.file_size_mb, settings.chunk_size, settings.read_iterations)
            .with_temp_dir(temp_dir)
    }

    /// Place the test file in `dir` instead of the platform temp directory
    pub fn with_temp_dir(mut self, dir: PathBuf) -> Self {
        self.temp_dir = dir;
        self
    }

    /// Run the write test, then the read test, then remove the file
    pub fn run(&self, progress: &mut dyn Progress) -> Result<IoBenchmarkResult> {
        transfer_bytes(self.size_mb, u64::from(self.read_iterations) + 1)?;
        let start = Instant::now();

        fs::create_dir_all(&self.temp_dir).map_err(|e| Error::io_write(&self.temp_dir, e))?;
        let temp = TempFile::new(&self.temp_dir);
        info!(path = %temp.path().display(), "Created temporary test file path");

        let write = IoWriteBenchmark::new(self.size_mb, self.chunk_size).run(temp.path(), progress)?;
        let read = IoReadBenchmark::new(self.size_mb, self.chunk_size, self.read_iterations)
            .run(temp.path(), progress)?;

        let temp_path = temp.path().to_path_buf();
        temp.remove();

        let total_elapsed_seconds = utils::elapsed_seconds(start.elapsed());
        let total_mb = self.size_mb + self.size_mb * u64::from(self.read_iterations);
        let combined_mbps = utils::throughput_mbps(total_mb, total_elapsed_seconds);

        info!(
            combined_mbps,
            total_elapsed_secs = total_elapsed_seconds,
            "I/O benchmark complete"
        );

        Ok(IoBenchmarkResult {
            write,
            read,
            combined_mbps,
            total_elapsed_seconds,
            temp_path,
        })
    }
}

/// Bytes moved by `passes` passes over the test file
///
/// Sizes whose byte count does not fit in a `u64` are rejected as invalid
/// configuration rather than wrapped.
fn transfer_bytes(size_mb: u64, passes: u64) -> Result<u64> {
    utils::checked_bytes(size_mb, passes).ok_or_else(|| {
        Error::config_field_invalid(
            "io.file_size_mb",
            format!("{} MB over {} pass(es) is too large to measure", size_mb, passes),
        )
    })
}

/// Test file that is removed when dropped
///
/// Removal failures are logged, never returned.
struct TempFile {
    path: PathBuf,
    removed: bool,
}

impl TempFile {
    fn new(dir: &Path) -> Self {
        let name = format!("hostbench-io-{}.tmp", uuid::Uuid::new_v4().simple());
        Self {
            path: dir.join(name),
            removed: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file now instead of at drop
    fn remove(mut self) {
        self.removed = true;
        remove_logged(&self.path);
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if !self.removed {
            remove_logged(&self.path);
        }
    }
}

fn remove_logged(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed temporary test file"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove temporary test file"),
    }
}
