//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for hostbench.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::bench::{CPU_BENCHMARK_NAME, IO_BENCHMARK_NAME};
use crate::config::BenchConfig;

/// hostbench - CPU and disk benchmarks with execution history
///
/// Runs a naive primality sweep or a sequential file write/read test, times
/// each run and keeps best, worst and average times over the last 24 hours,
/// 30 days and all time.
#[derive(Parser, Debug)]
#[command(name = "hostbench")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress bars and all logging except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "HOSTBENCH_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the CPU benchmark (count primes by trial division)
    Cpu(CpuArgs),

    /// Run the disk I/O benchmark (sequential write, then repeated reads)
    Io(IoArgs),

    /// Show recorded execution statistics without running anything
    History {
        /// Benchmark whose history to show
        #[arg(value_enum)]
        benchmark: BenchmarkKind,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Display version and build information
    Version,
}

/// Options shared by the benchmark commands
#[derive(Args, Debug, Clone, Default)]
pub struct RunOptions {
    /// Save the result as JSON to this file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Do not record this run in the execution history
    #[arg(long)]
    pub no_track: bool,
}

/// CPU benchmark options
#[derive(Args, Debug, Clone, Default)]
pub struct CpuArgs {
    /// Exclusive upper bound of the primality sweep
    #[arg(long)]
    pub max_numbers: Option<u64>,

    #[command(flatten)]
    pub run: RunOptions,
}

impl CpuArgs {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut BenchConfig) {
        if let Some(max) = self.max_numbers {
            config.cpu.max_numbers = max;
        }
    }
}

/// I/O benchmark options
#[derive(Args, Debug, Clone, Default)]
pub struct IoArgs {
    /// Size of the test file in MB
    #[arg(long)]
    pub file_size_mb: Option<u64>,

    /// Bytes per read/write call
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Number of times the file is read back
    #[arg(long)]
    pub read_iterations: Option<u32>,

    /// Directory for the temporary test file
    #[arg(long)]
    pub temp_dir: Option<String>,

    #[command(flatten)]
    pub run: RunOptions,
}

impl IoArgs {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut BenchConfig) {
        if let Some(size) = self.file_size_mb {
            config.io.file_size_mb = size;
        }
        if let Some(chunk) = self.chunk_size {
            config.io.chunk_size = chunk;
        }
        if let Some(iterations) = self.read_iterations {
            config.io.read_iterations = iterations;
        }
        if let Some(ref dir) = self.temp_dir {
            config.io.temp_dir = Some(dir.clone());
        }
    }
}

/// Benchmarks with a recorded history
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchmarkKind {
    Cpu,
    Io,
}

impl BenchmarkKind {
    /// Name used in the execution history
    pub fn record_name(&self) -> &'static str {
        match self {
            BenchmarkKind::Cpu => CPU_BENCHMARK_NAME,
            BenchmarkKind::Io => IO_BENCHMARK_NAME,
        }
    }
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the effective configuration
    Show,

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the configuration
    Validate,
}
