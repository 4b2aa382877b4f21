//! Append-only CSV store of execution records
//!
//! One header line, then one `timestamp,benchmark,seconds` line per run.
//! Lines are never rewritten.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Header written when the store is created
pub const HEADER: [&str; 3] = ["date", "command", "execution_time_seconds"];

/// Timestamps are stored in UTC with second precision
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One completed benchmark run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionRecord {
    pub timestamp: DateTime<Utc>,
    pub benchmark: String,
    pub elapsed_seconds: f64,
}

impl ExecutionRecord {
    pub fn new(timestamp: DateTime<Utc>, benchmark: impl Into<String>, elapsed_seconds: f64) -> Self {
        Self {
            timestamp,
            benchmark: benchmark.into(),
            elapsed_seconds,
        }
    }

    fn to_row(&self) -> [String; 3] {
        [
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            self.benchmark.clone(),
            format!("{:.2}", self.elapsed_seconds),
        ]
    }

    fn from_row(row: &csv::StringRecord) -> Option<Self> {
        let timestamp = parse_timestamp(row.get(0)?)?;
        let benchmark = row.get(1)?.to_string();
        let elapsed_seconds = row.get(2)?.trim().parse().ok()?;
        Some(Self {
            timestamp,
            benchmark,
            elapsed_seconds,
        })
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc)))
        .ok()
}

/// Durable record log backed by a CSV file
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the store and its header if it does not exist yet
    pub fn ensure_created(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.create_error(e.into()))?;
        }

        let file = match OpenOptions::new().write(true).create_new(true).open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(()),
            Err(e) => return Err(self.create_error(e.into())),
        };

        let mut writer = csv::Writer::from_writer(file);
        writer
            .write_record(HEADER)
            .map_err(|e| self.create_error(e))?;
        writer.flush().map_err(|e| self.create_error(e.into()))?;

        debug!(path = %self.path.display(), "Created execution record store");
        Ok(())
    }

    /// Append one record as a single line
    pub fn append(&self, record: &ExecutionRecord) -> Result<()> {
        self.ensure_created()?;

        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| self.append_error(e.into()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer
            .write_record(record.to_row())
            .map_err(|e| self.append_error(e))?;
        writer.flush().map_err(|e| self.append_error(e.into()))?;

        debug!(
            benchmark = %record.benchmark,
            elapsed_secs = record.elapsed_seconds,
            "Execution record appended"
        );
        Ok(())
    }

    /// All records for `benchmark`, in file order
    ///
    /// The file is parsed once; rows that are short, not UTF-8 or unparseable
    /// are skipped.
    pub fn records_for(&self, benchmark: &str) -> Result<Vec<ExecutionRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| self.read_error(e))?;

        let mut records = Vec::new();
        for row in reader.byte_records() {
            let row = row.map_err(|e| self.read_error(e))?;
            let line = row.position().map(|p| p.line()).unwrap_or_default();

            let row = match csv::StringRecord::from_byte_record(row) {
                Ok(row) => row,
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        line,
                        error = %e.utf8_error(),
                        "Skipping execution record that is not valid UTF-8"
                    );
                    continue;
                }
            };

            if row.len() < HEADER.len() {
                warn!(path = %self.path.display(), line, "Skipping short execution record");
                continue;
            }
            if row.get(1) != Some(benchmark) {
                continue;
            }

            match ExecutionRecord::from_row(&row) {
                Some(record) => records.push(record),
                None => warn!(path = %self.path.display(), line, "Skipping malformed execution record"),
            }
        }

        Ok(records)
    }

    fn create_error(&self, source: csv::Error) -> Error {
        Error::RecordStoreCreate {
            path: self.path.clone(),
            source,
        }
    }

    fn append_error(&self, source: csv::Error) -> Error {
        Error::RecordStoreAppend {
            path: self.path.clone(),
            source,
        }
    }

    fn read_error(&self, source: csv::Error) -> Error {
        Error::RecordStoreRead {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, h, m, s).unwrap()
    }

    #[test]
    fn test_store_created_with_header() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("nested").join("times.csv"));

        store.ensure_created().unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(content, "date,command,execution_time_seconds\n");
    }

    #[test]
    fn test_ensure_created_keeps_existing_content() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("times.csv"));
        store
            .append(&ExecutionRecord::new(at(9, 0, 0), "benchmark:cpu", 1.0))
            .unwrap();

        store.ensure_created().unwrap();

        assert_eq!(store.records_for("benchmark:cpu").unwrap().len(), 1);
    }

    #[test]
    fn test_append_format() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("times.csv"));

        store
            .append(&ExecutionRecord::new(at(8, 5, 9), "benchmark:cpu", 12.3456))
            .unwrap();
        store
            .append(&ExecutionRecord::new(at(8, 6, 0), "benchmark:io", 0.5))
            .unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "date,command,execution_time_seconds",
                "2026-10-16 08:05:09,benchmark:cpu,12.35",
                "2026-10-16 08:06:00,benchmark:io,0.50",
            ]
        );
    }

    #[test]
    fn test_records_filtered_by_name() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("times.csv"));
        store.append(&ExecutionRecord::new(at(1, 0, 0), "benchmark:cpu", 2.0)).unwrap();
        store.append(&ExecutionRecord::new(at(2, 0, 0), "benchmark:io", 9.0)).unwrap();
        store.append(&ExecutionRecord::new(at(3, 0, 0), "benchmark:cpu", 4.0)).unwrap();

        let cpu = store.records_for("benchmark:cpu").unwrap();
        assert_eq!(
            cpu,
            vec![
                ExecutionRecord::new(at(1, 0, 0), "benchmark:cpu", 2.0),
                ExecutionRecord::new(at(3, 0, 0), "benchmark:cpu", 4.0),
            ]
        );
        assert!(store.records_for("benchmark:gpu").unwrap().is_empty());
    }

    #[test]
    fn test_missing_store_has_no_records() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("absent.csv"));

        assert!(store.records_for("benchmark:cpu").unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("times.csv");
        fs::write(
            &path,
            "date,command,execution_time_seconds\n\
             2026-10-16 10:00:00,benchmark:cpu,3.00\n\
             garbage\n\
             not-a-date,benchmark:cpu,1.00\n\
             2026-10-16 11:00:00,benchmark:cpu,fast\n\
             2026-10-16T12:00:00Z,benchmark:cpu,5.25\n",
        )
        .unwrap();

        let records = RecordStore::new(&path).records_for("benchmark:cpu").unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].elapsed_seconds, 3.0);
        assert_eq!(records[1].timestamp, at(12, 0, 0));
        assert_eq!(records[1].elapsed_seconds, 5.25);
    }

    #[test]
    fn test_non_utf8_rows_are_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("times.csv");
        let mut content = b"date,command,execution_time_seconds\n\
                            2026-10-16 10:00:00,benchmark:cpu,3.00\n"
            .to_vec();
        content.extend_from_slice(b"2026-10-16 10:01:00,bench\xff\xfe,1.00\n");
        content.extend_from_slice(b"2026-10-16 10:02:00,benchmark:cpu,4.00\n");
        fs::write(&path, content).unwrap();

        let records = RecordStore::new(&path).records_for("benchmark:cpu").unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].elapsed_seconds, 3.0);
        assert_eq!(records[1].timestamp, at(10, 2, 0));
    }

    #[test]
    fn test_create_fails_when_parent_is_a_file() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();

        let store = RecordStore::new(blocker.join("times.csv"));
        let err = store
            .append(&ExecutionRecord::new(at(1, 0, 0), "benchmark:cpu", 1.0))
            .unwrap_err();

        assert!(matches!(err, Error::RecordStoreCreate { .. }));
    }
}
