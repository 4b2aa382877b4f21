//! CLI integration tests
//!
//! Tests the command-line interface using assert_cmd

mod common;

use std::fs;

use predicates::prelude::*;

use common::TestEnvironment;

// ─────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    TestEnvironment::new()
        .cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("hostbench"))
        .stdout(predicate::str::contains("cpu"))
        .stdout(predicate::str::contains("io"))
        .stdout(predicate::str::contains("history"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_version_command() {
    TestEnvironment::new()
        .cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hostbench"))
        .stdout(predicate::str::contains("Build Information"))
        .stdout(predicate::str::contains("Git Hash"))
        .stdout(predicate::str::contains("Target"));
}

#[test]
fn test_short_version_flag() {
    TestEnvironment::new()
        .cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hostbench"));
}

// ─────────────────────────────────────────────────────────────────
// CPU Benchmark Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_cpu_reports_primes() {
    let env = TestEnvironment::new();

    env.cmd()
        .args(["cpu", "--max-numbers", "100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 25 primes"))
        .stdout(predicate::str::contains("Last prime found was 97"))
        .stdout(predicate::str::contains("Execution time"))
        .stdout(predicate::str::contains("All-time statistics: benchmark:cpu"))
        .stdout(predicate::str::contains("Last 24 hours statistics: benchmark:cpu"));
}

#[test]
fn test_cpu_with_no_primes() {
    TestEnvironment::new()
        .cmd()
        .args(["cpu", "--max-numbers", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 0 primes"))
        .stdout(predicate::str::contains("No primes found"));
}

#[test]
fn test_cpu_runs_are_recorded() {
    let env = TestEnvironment::new();

    for _ in 0..2 {
        env.cmd()
            .args(["cpu", "--max-numbers", "50"])
            .assert()
            .success();
    }

    let lines = env.history_lines();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "date,command,execution_time_seconds");
    for line in &lines[1..] {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[1], "benchmark:cpu");
        assert!(fields[2].parse::<f64>().is_ok());
        assert_eq!(fields[2].split('.').nth(1).map(str::len), Some(2));
    }
}

#[test]
fn test_cpu_no_track_leaves_history_alone() {
    let env = TestEnvironment::new();

    env.cmd()
        .args(["cpu", "--max-numbers", "100", "--no-track"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 25 primes"))
        .stdout(predicate::str::contains("statistics").not());

    assert!(!env.history_file().exists());
}

#[test]
fn test_cpu_zero_bound_rejected() {
    TestEnvironment::new()
        .cmd()
        .args(["cpu", "--max-numbers", "0"])
        .assert()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("E102"));
}

#[test]
fn test_cpu_output_file() {
    let env = TestEnvironment::new();
    let output = env.root().join("results").join("cpu.json");

    env.cmd()
        .args(["cpu", "--max-numbers", "100", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Results saved to"));

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(value["benchmark"], "benchmark:cpu");
    assert_eq!(value["result"]["primes_found"], 25);
    assert_eq!(value["result"]["last_prime"], 97);
    assert!(value["host"]["hostname"].is_string());
    assert_eq!(value["statistics"]["windows"].as_array().unwrap().len(), 3);
}

// ─────────────────────────────────────────────────────────────────
// I/O Benchmark Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_io_small_file() {
    let env = TestEnvironment::new();

    env.cmd()
        .args([
            "io",
            "--file-size-mb",
            "1",
            "--chunk-size",
            "4096",
            "--read-iterations",
            "2",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 1 MB"))
        .stdout(predicate::str::contains("Read iteration 1/2"))
        .stdout(predicate::str::contains("Read iteration 2/2"))
        .stdout(predicate::str::contains("I/O Performance Summary"))
        .stdout(predicate::str::contains("All-time statistics: benchmark:io"));

    // Test file is cleaned up
    let leftovers: Vec<_> = fs::read_dir(&env.temp_dir).unwrap().collect();
    assert!(leftovers.is_empty());

    let lines = env.history_lines();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains(",benchmark:io,"));
}

#[test]
fn test_io_zero_chunk_rejected() {
    TestEnvironment::new()
        .cmd()
        .args(["io", "--file-size-mb", "1", "--chunk-size", "0"])
        .assert()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("chunk_size"));
}

#[test]
fn test_io_oversized_file_rejected() {
    let env = TestEnvironment::new();

    env.cmd()
        .args(["io", "--file-size-mb", "17592186044416"])
        .assert()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("file_size_mb"));

    assert!(!env.history_file().exists());
}

#[test]
fn test_io_unwritable_temp_dir() {
    let env = TestEnvironment::new();
    let blocker = env.root().join("blocker");
    fs::write(&blocker, b"not a directory").unwrap();

    env.cmd()
        .args(["io", "--file-size-mb", "1", "--read-iterations", "1", "--temp-dir"])
        .arg(blocker.join("sub"))
        .assert()
        .failure()
        .code(20);

    assert!(!env.history_file().exists());
}

// ─────────────────────────────────────────────────────────────────
// History Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_history_empty() {
    TestEnvironment::new()
        .cmd()
        .args(["history", "cpu"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No execution history for benchmark:cpu"));
}

#[test]
fn test_history_after_run() {
    let env = TestEnvironment::new();
    env.cmd()
        .args(["cpu", "--max-numbers", "20"])
        .assert()
        .success();

    env.cmd()
        .args(["history", "cpu"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All-time statistics: benchmark:cpu"))
        .stdout(predicate::str::contains("Last 30 days statistics: benchmark:cpu"))
        .stdout(predicate::str::contains("Average"));

    env.cmd()
        .args(["history", "io"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No execution history for benchmark:io"));
}

#[test]
fn test_history_skips_old_and_malformed_rows() {
    let env = TestEnvironment::new();
    fs::create_dir_all(&env.data_dir).unwrap();
    fs::write(
        env.history_file(),
        "date,command,execution_time_seconds\n\
         2001-01-01 00:00:00,benchmark:cpu,42.00\n\
         broken line\n",
    )
    .unwrap();

    env.cmd()
        .args(["history", "cpu"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All-time statistics: benchmark:cpu"))
        .stdout(predicate::str::contains("42.00s"))
        .stdout(predicate::str::contains("Last 30 days").not());
}

#[test]
fn test_run_succeeds_with_corrupt_history_row() {
    let env = TestEnvironment::new();
    fs::create_dir_all(&env.data_dir).unwrap();
    let mut content = b"date,command,execution_time_seconds\n".to_vec();
    content.extend_from_slice(b"2026-10-16 10:01:00,bench\xff\xfe,1.00\n");
    fs::write(env.history_file(), content).unwrap();

    env.cmd()
        .args(["cpu", "--max-numbers", "20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All-time statistics: benchmark:cpu"));

    let stored = fs::read(env.history_file()).unwrap();
    assert_eq!(stored.iter().filter(|b| **b == b'\n').count(), 3);
}

#[test]
fn test_record_store_failure_keeps_result() {
    let env = TestEnvironment::new();
    let blocker = env.root().join("blocker");
    fs::write(&blocker, b"not a directory").unwrap();

    env.cmd()
        .env("HOSTBENCH_HISTORY_FILE", blocker.join("times.csv"))
        .args(["cpu", "--max-numbers", "100"])
        .assert()
        .failure()
        .code(30)
        .stdout(predicate::str::contains("Found 25 primes"))
        .stdout(predicate::str::contains("Execution time"))
        .stderr(predicate::str::contains("E300"));
}

// ─────────────────────────────────────────────────────────────────
// Config Command Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_config_show_default() {
    TestEnvironment::new()
        .cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[cpu]"))
        .stdout(predicate::str::contains("[io]"))
        .stdout(predicate::str::contains("[logging]"))
        .stdout(predicate::str::contains("[storage]"));
}

#[test]
fn test_config_validate_default() {
    TestEnvironment::new()
        .cmd()
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_config_validate_nonexistent_file() {
    TestEnvironment::new()
        .cmd()
        .args(["config", "validate", "--config", "/nonexistent/path/config.toml"])
        .assert()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_config_init_writes_file() {
    let env = TestEnvironment::new();
    let path = env.root().join("conf").join("hostbench.toml");

    env.cmd()
        .args(["config", "init", "--path"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration written to"));
    assert!(path.exists());

    env.cmd()
        .args(["config", "init", "--path"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    env.cmd()
        .args(["config", "init", "--force", "--path"])
        .arg(&path)
        .assert()
        .success();

    env.cmd()
        .args(["config", "validate", "--config"])
        .arg(&path)
        .assert()
        .success();
}

#[test]
fn test_config_init_help() {
    TestEnvironment::new()
        .cmd()
        .args(["config", "init", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialize"))
        .stdout(predicate::str::contains("--path"))
        .stdout(predicate::str::contains("--force"));
}
