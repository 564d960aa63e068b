//! JSONL activity log: append-only line-delimited JSON.
//!
//! Each line is a self-contained JSON object, assembled in memory and written
//! with a single `write_all` so a concurrently tailing process never sees a
//! partial line.
//!
//! Fallback chain:
//! 1. Configured log file
//! 2. stderr with `[BW-LOG]` prefix
//! 3. Silent discard (a scan must never fail because logging did)

#![allow(missing_docs)]

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Severity level for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Event types matching the audit lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ScanComplete,
    ReportWritten,
    ReportPruned,
    AccessDenied,
    Error,
}

/// A single JSONL entry — `ts`, `event`, `severity` always present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// ISO 8601 UTC timestamp.
    pub ts: String,
    pub event: EventType,
    pub severity: Severity,
    /// Affected filesystem path (when applicable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Count of affected items (findings, pruned reports).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    /// BW error code if the event records a failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Freeform details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl LogEntry {
    /// Create a new entry stamped with the current UTC time.
    #[must_use]
    pub fn new(event: EventType, severity: Severity) -> Self {
        Self {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            event,
            severity,
            path: None,
            count: None,
            error_code: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    #[must_use]
    pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Append-only JSONL writer with graceful degradation.
#[derive(Debug, Clone)]
pub struct JsonlLogger {
    path: Option<PathBuf>,
}

impl JsonlLogger {
    /// Logger writing to `path`; parent directory is created on first append.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// Logger that only ever falls back to stderr.
    #[must_use]
    pub const fn stderr_only() -> Self {
        Self { path: None }
    }

    /// Append one entry. Never returns an error: failures degrade down the
    /// fallback chain and end in silent discard.
    pub fn append(&self, entry: LogEntry) {
        let Ok(mut line) = serde_json::to_string(&entry) else {
            return;
        };
        line.push('\n');

        if let Some(path) = &self.path
            && Self::append_to_file(path, &line)
        {
            return;
        }

        // stderr fallback; ignore failure (discard).
        let _ = std::io::stderr().write_all(format!("[BW-LOG] {line}").as_bytes());
    }

    fn append_to_file(path: &std::path::Path, line: &str) -> bool {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && std::fs::create_dir_all(parent).is_err()
        {
            return false;
        }
        let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) else {
            return false;
        };
        file.write_all(line.as_bytes()).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn appends_one_json_object_per_line() {
        let tmp = TempDir::new().unwrap();
        let log_path = tmp.path().join("activity.jsonl");
        let logger = JsonlLogger::new(log_path.clone());

        logger.append(LogEntry::new(EventType::ScanComplete, Severity::Info).with_count(3));
        logger.append(
            LogEntry::new(EventType::ReportWritten, Severity::Info).with_path("/tmp/report.txt"),
        );

        let raw = std::fs::read_to_string(&log_path).unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "scan_complete");
        assert_eq!(first["severity"], "info");
        assert_eq!(first["count"], 3);

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["event"], "report_written");
        assert_eq!(second["path"], "/tmp/report.txt");
    }

    #[test]
    fn optional_fields_are_omitted() {
        let tmp = TempDir::new().unwrap();
        let log_path = tmp.path().join("activity.jsonl");
        let logger = JsonlLogger::new(log_path.clone());

        logger.append(LogEntry::new(EventType::ScanComplete, Severity::Info));

        let raw = std::fs::read_to_string(&log_path).unwrap();
        assert!(!raw.contains("\"path\""));
        assert!(!raw.contains("\"error_code\""));
    }

    #[test]
    fn creates_parent_directory() {
        let tmp = TempDir::new().unwrap();
        let log_path = tmp.path().join("nested").join("dir").join("activity.jsonl");
        let logger = JsonlLogger::new(log_path.clone());
        logger.append(LogEntry::new(EventType::Error, Severity::Error).with_error_code("BW-3101"));
        assert!(log_path.exists());
    }

    #[test]
    fn stderr_only_logger_does_not_panic() {
        let logger = JsonlLogger::stderr_only();
        logger.append(LogEntry::new(EventType::AccessDenied, Severity::Warning));
    }
}
