//! Shared fixtures for the CLI tests
//!
//! Every command runs with its home, config, data and temp directories
//! redirected into a private temp dir, so tests never touch the real
//! execution history or pick up a user configuration file.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

pub struct TestEnvironment {
    root: TempDir,
    pub data_dir: PathBuf,
    pub temp_dir: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        let data_dir = root.path().join("data");
        let temp_dir = root.path().join("scratch");
        Self {
            root,
            data_dir,
            temp_dir,
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Default location of the execution record store
    pub fn history_file(&self) -> PathBuf {
        self.data_dir.join("execution_times.csv")
    }

    pub fn history_lines(&self) -> Vec<String> {
        fs::read_to_string(self.history_file())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Write a config file into the environment and return its path
    pub fn write_config(&self, content: &str) -> PathBuf {
        let path = self.root.path().join("config.toml");
        fs::write(&path, content).unwrap();
        path
    }

    /// The hostbench binary, isolated from the host environment
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("hostbench").unwrap();
        cmd.current_dir(self.root.path())
            .env("HOME", self.root.path())
            .env("XDG_CONFIG_HOME", self.root.path().join(".config"))
            .env("HOSTBENCH_DATA_DIR", &self.data_dir)
            .env("HOSTBENCH_TEMP_DIR", &self.temp_dir)
            .env_remove("HOSTBENCH_CONFIG")
            .env_remove("HOSTBENCH_HISTORY_FILE")
            .env_remove("HOSTBENCH_MAX_NUMBERS_TO_CALCULATE")
            .env_remove("HOSTBENCH_FILE_SIZE_MB")
            .env_remove("HOSTBENCH_CHUNK_SIZE")
            .env_remove("HOSTBENCH_READ_ITERATIONS")
            .env_remove("HOSTBENCH_LOG_LEVEL")
            .env_remove("HOSTBENCH_LOG_FILE")
            .env_remove("HOSTBENCH_LOG_JSON")
            .env_remove("RUST_LOG");
        cmd
    }
}
