//! hostbench - CPU and disk benchmarks with execution history
//!
//! Entry point for the hostbench binary. Each benchmark run is timed and
//! appended to a CSV history from which best, worst and average times are
//! reported.

mod bench;
mod cli;
mod config;
mod error;
mod logging;
mod output;
mod tracker;
mod utils;
mod version;

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Serialize;
use tracing::{debug, info};

use crate::bench::{CpuBenchmark, IoBenchmark, CPU_BENCHMARK_NAME, IO_BENCHMARK_NAME};
use crate::cli::{Cli, Commands, ConfigSubcommand, CpuArgs, IoArgs, RunOptions};
use crate::config::BenchConfig;
use crate::error::Result;
use crate::output::{ConsoleProgress, SavedRun};
use crate::tracker::ExecutionTimeTracker;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    // Commands that don't need the full logging setup
    match &cli.command {
        Commands::Version => {
            version::print_version();
            return Ok(());
        }
        Commands::Config { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            return handle_config_command(subcommand.clone(), cli.config.as_deref());
        }
        _ => {}
    }

    let mut config = BenchConfig::load_unvalidated(cli.config.as_deref())?;
    match &cli.command {
        Commands::Cpu(args) => args.apply(&mut config),
        Commands::Io(args) => args.apply(&mut config),
        _ => {}
    }
    config.validate()?;

    // The guards must be kept alive for the lifetime of the program
    let _log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;

    let build = version::build_info();
    info!(
        version = %build.full_version(),
        target = %build.target,
        release = build.is_release(),
        history = %config.history_path().display(),
        "Starting hostbench"
    );

    match cli.command {
        Commands::Cpu(args) => run_cpu(&config, &args, cli.quiet),
        Commands::Io(args) => run_io(&config, &args, cli.quiet),
        Commands::History { benchmark } => show_history(&config, benchmark.record_name()),
        Commands::Version | Commands::Config { .. } => {
            // Already handled above
            unreachable!();
        }
    }
}

/// Run the primality sweep
fn run_cpu(config: &BenchConfig, args: &CpuArgs, quiet: bool) -> Result<()> {
    let bench = CpuBenchmark::new(config.cpu.max_numbers);
    let mut progress = ConsoleProgress::new(quiet);

    println!("CPU benchmark: checking numbers below {}", config.cpu.max_numbers);

    execute(
        CPU_BENCHMARK_NAME,
        &args.run,
        config.history_path(),
        || Ok(bench.run(&mut progress)),
        output::cpu_summary,
    )
}

/// Run the write and read tests
fn run_io(config: &BenchConfig, args: &IoArgs, quiet: bool) -> Result<()> {
    let bench = IoBenchmark::from_settings(&config.io, config.temp_dir());
    let mut progress = ConsoleProgress::new(quiet);

    println!(
        "I/O benchmark: {} MB file, {} byte chunks, {} read iteration(s) in {}",
        config.io.file_size_mb,
        config.io.chunk_size,
        config.io.read_iterations,
        config.temp_dir().display()
    );

    execute(
        IO_BENCHMARK_NAME,
        &args.run,
        config.history_path(),
        || bench.run(&mut progress),
        output::io_summary,
    )
}

/// Run a benchmark, track it unless asked not to, print and optionally save the result
///
/// A record store failure is returned only after the result has been shown
/// and saved.
fn execute<R, F>(
    name: &str,
    options: &RunOptions,
    history_path: PathBuf,
    invoke: F,
    summary: fn(&R) -> String,
) -> Result<()>
where
    R: Serialize,
    F: FnOnce() -> Result<R>,
{
    if options.no_track {
        debug!(benchmark = name, "Tracking disabled for this run");
        let value = invoke()?;
        print!("{}", summary(&value));

        if let Some(ref path) = options.output {
            save(&SavedRun::new(name, &value), path)?;
        }
        return Ok(());
    }

    let tracker = ExecutionTimeTracker::new(history_path);
    let run = tracker.track(name, invoke)?;

    print!("{}", summary(&run.value));
    println!();
    print!("{}", output::execution_time_table(name, run.elapsed_seconds));

    let (report, history_error) = match run.history {
        Ok(report) => (Some(report), None),
        Err(e) => (None, Some(e)),
    };

    if let Some(ref report) = report {
        println!();
        print!("{}", output::statistics_tables(report));
    }

    if let Some(ref path) = options.output {
        let mut saved = SavedRun::new(name, &run.value);
        saved.tracked_seconds = Some(run.elapsed_seconds);
        saved.statistics = report.as_ref();
        save(&saved, path)?;
    }

    match history_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn save<T: Serialize>(run: &SavedRun<'_, T>, path: &str) -> Result<()> {
    output::save_results(run, Path::new(path))?;
    println!("Results saved to: {}", path);
    Ok(())
}

/// Print recorded statistics for one benchmark
fn show_history(config: &BenchConfig, name: &str) -> Result<()> {
    let tracker = ExecutionTimeTracker::new(config.history_path());
    let report = tracker.statistics(name)?;
    print!("{}", output::statistics_tables(&report));
    Ok(())
}

/// Handle configuration subcommands
fn handle_config_command(subcommand: ConfigSubcommand, config_path: Option<&str>) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show => {
            let cfg = BenchConfig::load(config_path)?;
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            let written = config::init_config(path.as_deref(), force)?;
            println!("Configuration written to {}", written.display());
        }
        ConfigSubcommand::Validate => {
            BenchConfig::load(config_path)?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}
