//! Configuration system for hostbench
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (HOSTBENCH_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::utils;

/// File name of the execution record store inside the data directory
pub const HISTORY_FILE_NAME: &str = "execution_times.csv";

/// Main benchmark configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// CPU benchmark settings
    pub cpu: CpuSettings,

    /// Disk I/O benchmark settings
    pub io: IoSettings,

    /// Logging configuration
    pub logging: LoggingSettings,

    /// Data storage paths
    pub storage: StorageSettings,
}

/// CPU benchmark settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuSettings {
    /// Exclusive upper bound of the primality sweep
    pub max_numbers: u64,
}

/// Disk I/O benchmark settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IoSettings {
    /// Size of the test file in megabytes
    pub file_size_mb: u64,

    /// Bytes per read/write call
    pub chunk_size: usize,

    /// Number of full-file re-reads
    pub read_iterations: u32,

    /// Directory for the test file (platform temp dir when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<String>,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

/// Storage path settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Base data directory
    pub data_dir: String,

    /// Explicit execution record store path (defaults to `<data_dir>/execution_times.csv`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_file: Option<String>,
}

impl Default for CpuSettings {
    fn default() -> Self {
        Self { max_numbers: 120_000 }
    }
}

impl Default for IoSettings {
    fn default() -> Self {
        Self {
            file_size_mb: 15_000,
            chunk_size: 8192,
            read_iterations: 3,
            temp_dir: None,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            max_files: 5,
            json_format: false,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.hostbench".to_string(),
            history_file: None,
        }
    }
}

impl BenchConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let config = Self::load_unvalidated(config_path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load like [`BenchConfig::load`] but leave validation to the caller,
    /// for when command-line overrides are still to be applied
    pub fn load_unvalidated(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path).map_err(|e| Error::io_read(&path, e))?;
            config = toml::from_str(&content).map_err(|e| {
                Error::config_parse(format!("invalid TOML in {}", path.display()), e)
            })?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        config.apply_env_overrides();
        config.expand_paths();

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            return if path.exists() {
                Ok(Some(path))
            } else {
                Err(Error::config_not_found(path))
            };
        }

        let search_paths = [
            PathBuf::from("hostbench.toml"),
            dirs::config_dir()
                .map(|p| p.join("hostbench").join("config.toml"))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|p| p.join(".hostbench").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &search_paths {
            if path.is_file() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Some(n) = env_parse("HOSTBENCH_MAX_NUMBERS_TO_CALCULATE") {
            self.cpu.max_numbers = n;
        }

        if let Some(n) = env_parse("HOSTBENCH_FILE_SIZE_MB") {
            self.io.file_size_mb = n;
        }
        if let Some(n) = env_parse("HOSTBENCH_CHUNK_SIZE") {
            self.io.chunk_size = n;
        }
        if let Some(n) = env_parse("HOSTBENCH_READ_ITERATIONS") {
            self.io.read_iterations = n;
        }
        if let Ok(val) = std::env::var("HOSTBENCH_TEMP_DIR") {
            self.io.temp_dir = Some(val);
        }

        if let Ok(val) = std::env::var("HOSTBENCH_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("HOSTBENCH_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("HOSTBENCH_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("HOSTBENCH_DATA_DIR") {
            self.storage.data_dir = val;
        }
        if let Ok(val) = std::env::var("HOSTBENCH_HISTORY_FILE") {
            self.storage.history_file = Some(val);
        }
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        self.storage.data_dir = expand_path(&self.storage.data_dir);

        for path in [
            &mut self.storage.history_file,
            &mut self.io.temp_dir,
            &mut self.logging.file,
        ]
        .into_iter()
        .flatten()
        {
            *path = expand_path(path);
        }
    }

    /// Validate the configuration
    ///
    /// Zero sizes, chunk sizes, iteration counts or CPU bounds would produce
    /// empty or divide-by-zero measurements, so they are rejected here.
    pub fn validate(&self) -> Result<()> {
        if self.cpu.max_numbers == 0 {
            return Err(Error::config_field_invalid(
                "cpu.max_numbers",
                "max_numbers must be greater than 0",
            ));
        }
        if self.io.file_size_mb == 0 {
            return Err(Error::config_field_invalid(
                "io.file_size_mb",
                "file_size_mb must be greater than 0",
            ));
        }
        if self.io.chunk_size == 0 {
            return Err(Error::config_field_invalid(
                "io.chunk_size",
                "chunk_size must be greater than 0",
            ));
        }
        if self.io.read_iterations == 0 {
            return Err(Error::config_field_invalid(
                "io.read_iterations",
                "read_iterations must be greater than 0",
            ));
        }
        // One write pass plus every read pass must be countable in bytes
        let passes = u64::from(self.io.read_iterations) + 1;
        if utils::checked_bytes(self.io.file_size_mb, passes).is_none() {
            return Err(Error::config_field_invalid(
                "io.file_size_mb",
                format!(
                    "file_size_mb {} with {} read iteration(s) is too large to measure",
                    self.io.file_size_mb, self.io.read_iterations
                ),
            ));
        }
        if self.storage.data_dir.trim().is_empty() {
            return Err(Error::config_field_invalid(
                "storage.data_dir",
                "data_dir cannot be empty",
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// Path of the execution record store
    pub fn history_path(&self) -> PathBuf {
        match self.storage.history_file {
            Some(ref file) => PathBuf::from(file),
            None => Path::new(&self.storage.data_dir).join(HISTORY_FILE_NAME),
        }
    }

    /// Directory where the I/O benchmark places its test file
    pub fn temp_dir(&self) -> PathBuf {
        self.io
            .temp_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|val| val.trim().parse().ok())
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".hostbench")
                .join("config.toml")
        });

    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io_write(parent, e))?;
    }

    fs::write(&config_path, DEFAULT_CONFIG).map_err(|e| Error::io_write(&config_path, e))?;

    info!(path = %config_path.display(), "Configuration file created");
    Ok(config_path)
}

/// Default configuration content with comments
const DEFAULT_CONFIG: &str = r#"# hostbench configuration

[cpu]
# Exclusive upper bound of the primality sweep
max_numbers = 120000

[io]
# Size of the test file in MB
file_size_mb = 15000

# Size of each read/write chunk in bytes
chunk_size = 8192

# Number of times to read the file back
read_iterations = 3

# Directory for the test file (defaults to the platform temp directory)
# temp_dir = "/var/tmp"

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log file path (comment out to disable file logging)
# file = "~/.hostbench/logs/hostbench.log"

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false

[storage]
# Base data directory; execution times are kept in execution_times.csv
data_dir = "~/.hostbench"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = BenchConfig::default();
        assert_eq!(config.cpu.max_numbers, 120_000);
        assert_eq!(config.io.file_size_mb, 15_000);
        assert_eq!(config.io.chunk_size, 8192);
        assert_eq!(config.io.read_iterations, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_file_matches_defaults() {
        let parsed: BenchConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        let defaults = BenchConfig::default();

        assert_eq!(parsed.cpu.max_numbers, defaults.cpu.max_numbers);
        assert_eq!(parsed.io.file_size_mb, defaults.io.file_size_mb);
        assert_eq!(parsed.io.chunk_size, defaults.io.chunk_size);
        assert_eq!(parsed.io.read_iterations, defaults.io.read_iterations);
        assert_eq!(parsed.storage.data_dir, defaults.storage.data_dir);
    }

    #[test]
    fn test_env_override() {
        std::env::set_var("HOSTBENCH_MAX_NUMBERS_TO_CALCULATE", "500");
        std::env::set_var("HOSTBENCH_READ_ITERATIONS", "7");
        std::env::set_var("HOSTBENCH_CHUNK_SIZE", "not-a-number");

        let mut config = BenchConfig::default();
        config.apply_env_overrides();

        assert_eq!(config.cpu.max_numbers, 500);
        assert_eq!(config.io.read_iterations, 7);
        // Unparseable values are ignored
        assert_eq!(config.io.chunk_size, 8192);

        std::env::remove_var("HOSTBENCH_MAX_NUMBERS_TO_CALCULATE");
        std::env::remove_var("HOSTBENCH_READ_ITERATIONS");
        std::env::remove_var("HOSTBENCH_CHUNK_SIZE");
    }

    #[test]
    fn test_validation_rejects_degenerate_values() {
        let mut config = BenchConfig::default();
        config.io.chunk_size = 0;
        assert!(matches!(
            config.validate(),
            Err(Error::ConfigValidation { field: Some(ref f), .. }) if f == "io.chunk_size"
        ));

        let mut config = BenchConfig::default();
        config.io.file_size_mb = 0;
        assert!(config.validate().is_err());

        let mut config = BenchConfig::default();
        config.io.read_iterations = 0;
        assert!(config.validate().is_err());

        let mut config = BenchConfig::default();
        config.cpu.max_numbers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_oversized_file() {
        let mut config = BenchConfig::default();
        config.io.file_size_mb = 1 << 44;
        assert!(matches!(
            config.validate(),
            Err(Error::ConfigValidation { field: Some(ref f), .. }) if f == "io.file_size_mb"
        ));

        // Fits for a single write but not once the read passes are counted
        let mut config = BenchConfig::default();
        config.io.file_size_mb = 1 << 42;
        config.io.read_iterations = 3;
        assert!(config.validate().is_err());
        config.io.read_iterations = 2;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_log_level() {
        let mut config = BenchConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_history_path() {
        let mut config = BenchConfig::default();
        config.storage.data_dir = "/srv/bench".to_string();
        assert_eq!(
            config.history_path(),
            PathBuf::from("/srv/bench/execution_times.csv")
        );

        config.storage.history_file = Some("/elsewhere/times.csv".to_string());
        assert_eq!(config.history_path(), PathBuf::from("/elsewhere/times.csv"));
    }

    #[test]
    fn test_path_expansion() {
        let mut config = BenchConfig::default();
        config.io.temp_dir = Some("~/scratch".to_string());
        config.expand_paths();

        assert!(!config.storage.data_dir.contains('~'));
        assert!(!config.io.temp_dir.unwrap().contains('~'));
    }

    #[test]
    fn test_parse_partial_config() {
        let config: BenchConfig = toml::from_str(
            r#"
[io]
file_size_mb = 64
chunk_size = 4096
"#,
        )
        .unwrap();

        assert_eq!(config.io.file_size_mb, 64);
        assert_eq!(config.io.chunk_size, 4096);
        assert_eq!(config.io.read_iterations, 3);
        assert_eq!(config.cpu.max_numbers, 120_000);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = BenchConfig::load(Some("/nonexistent/hostbench.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn test_init_config_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let path_str = path.to_str().unwrap();

        let created = init_config(Some(path_str), false).unwrap();
        assert_eq!(created, path);
        assert!(path.exists());

        assert!(init_config(Some(path_str), false).is_err());
        assert!(init_config(Some(path_str), true).is_ok());
    }
}
