//! Configuration system: TOML file + env var overrides + smart defaults.
//!
//! Replaces the mutable process-wide settings object of earlier BearWatch
//! versions with an immutable snapshot: `Config::load` produces a value that
//! is threaded through every call and never changes during a run.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{BwError, Result};
use crate::core::paths::expand_home;
use crate::scanner::ScanConfig;
use crate::scanner::policy::BenchmarkMode;

/// Full BearWatch configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
#[derive(Default)]
pub struct Config {
    pub scan: ScanSection,
    pub report: ReportSection,
    pub log: LogSection,
    /// Where this config was loaded from (not serialized back out).
    #[serde(skip)]
    pub config_file: PathBuf,
}

/// Traversal and classification knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScanSection {
    /// Directories to audit; empty means "use per-distro safe defaults".
    pub root_paths: Vec<PathBuf>,
    pub max_depth: usize,
    pub incremental_scan: bool,
    /// Unix seconds of the last completed scan, maintained after each run
    /// when incremental scanning is enabled.
    pub last_scan_timestamp: Option<u64>,
    pub benchmark_mode: BenchmarkMode,
}

/// Report output and retention knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReportSection {
    pub output_location: PathBuf,
    pub max_reports: usize,
}

/// Activity log knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogSection {
    pub enabled: bool,
    pub jsonl_log: PathBuf,
}

fn home_dir() -> PathBuf {
    env::var_os("HOME").map_or_else(
        || {
            eprintln!("[BW-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths");
            PathBuf::from("/tmp")
        },
        PathBuf::from,
    )
}

fn data_dir() -> PathBuf {
    home_dir().join(".local").join("share").join("bearwatch")
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            root_paths: Vec::new(),
            max_depth: 3,
            incremental_scan: false,
            last_scan_timestamp: None,
            benchmark_mode: BenchmarkMode::Legacy,
        }
    }
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            output_location: data_dir().join("reports"),
            max_reports: 10,
        }
    }
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            enabled: true,
            jsonl_log: data_dir().join("activity.jsonl"),
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        home_dir()
            .join(".config")
            .join("bearwatch")
            .join("config.toml")
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from the default
    /// path; defaults are used. An explicitly requested path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf)
                .map_err(|source| BwError::io(&path_buf, source))?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(BwError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.config_file = path_buf;
        cfg.apply_env_overrides()?;
        cfg.normalize_paths();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist the current snapshot back to its config file as TOML.
    pub fn save(&self) -> Result<()> {
        let rendered =
            toml::to_string_pretty(self).map_err(|err| BwError::Serialization {
                context: "toml",
                details: err.to_string(),
            })?;
        if let Some(parent) = self.config_file.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| BwError::io(parent, source))?;
        }
        fs::write(&self.config_file, rendered)
            .map_err(|source| BwError::io(&self.config_file, source))
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        set_env_usize("BW_SCAN_MAX_DEPTH", &mut self.scan.max_depth)?;
        set_env_bool("BW_SCAN_INCREMENTAL", &mut self.scan.incremental_scan)?;
        if let Some(raw) = read_env("BW_SCAN_LAST_SCAN_TIMESTAMP") {
            let value = raw.parse::<u64>().map_err(|_| BwError::InvalidConfig {
                details: format!("BW_SCAN_LAST_SCAN_TIMESTAMP: not a unix timestamp: {raw:?}"),
            })?;
            self.scan.last_scan_timestamp = Some(value);
        }
        if let Some(raw) = read_env("BW_SCAN_BENCHMARK_MODE") {
            self.scan.benchmark_mode = BenchmarkMode::parse(&raw)?;
        }
        if let Some(raw) = read_env("BW_SCAN_ROOT_PATHS") {
            self.scan.root_paths = env::split_paths(&raw).collect();
        }
        set_env_usize("BW_REPORT_MAX_REPORTS", &mut self.report.max_reports)?;
        if let Some(raw) = read_env("BW_REPORT_OUTPUT_LOCATION") {
            self.report.output_location = PathBuf::from(raw);
        }
        set_env_bool("BW_LOG_ENABLED", &mut self.log.enabled)?;
        if let Some(raw) = read_env("BW_LOG_JSONL") {
            self.log.jsonl_log = PathBuf::from(raw);
        }
        Ok(())
    }

    fn normalize_paths(&mut self) {
        self.report.output_location = expand_home(&self.report.output_location);
        self.log.jsonl_log = expand_home(&self.log.jsonl_log);
        for root in &mut self.scan.root_paths {
            *root = expand_home(root);
        }
    }

    /// Reject configurations the pipeline cannot honor. Root existence is
    /// checked later, at scan start, against the final resolved root set.
    pub fn validate(&self) -> Result<()> {
        if self.report.max_reports == 0 {
            return Err(BwError::InvalidConfig {
                details: "report.max_reports must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Build the immutable per-run scan parameters.
    #[must_use]
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            root_paths: self.scan.root_paths.clone(),
            max_depth: self.scan.max_depth,
            incremental_scan: self.scan.incremental_scan,
            last_scan_timestamp: self.scan.last_scan_timestamp,
            benchmark_mode: self.scan.benchmark_mode,
        }
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn set_env_usize(key: &str, target: &mut usize) -> Result<()> {
    if let Some(raw) = read_env(key) {
        *target = raw.parse().map_err(|_| BwError::InvalidConfig {
            details: format!("{key}: not a non-negative integer: {raw:?}"),
        })?;
    }
    Ok(())
}

fn set_env_bool(key: &str, target: &mut bool) -> Result<()> {
    if let Some(raw) = read_env(key) {
        *target = match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                return Err(BwError::InvalidConfig {
                    details: format!("{key}: not a boolean: {raw:?}"),
                });
            }
        };
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.scan.max_depth, 3);
        assert_eq!(cfg.report.max_reports, 10);
        assert_eq!(cfg.scan.benchmark_mode, BenchmarkMode::Legacy);
    }

    #[test]
    fn loads_toml_sections() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[scan]
root_paths = ["/home", "/etc"]
max_depth = 5
incremental_scan = true
last_scan_timestamp = 1700000000
benchmark_mode = "strict"

[report]
output_location = "/var/bearwatch/reports"
max_reports = 4
"#,
        )
        .unwrap();

        let cfg = Config::load(Some(&path)).unwrap();
        assert_eq!(cfg.scan.root_paths.len(), 2);
        assert_eq!(cfg.scan.max_depth, 5);
        assert!(cfg.scan.incremental_scan);
        assert_eq!(cfg.scan.last_scan_timestamp, Some(1_700_000_000));
        assert_eq!(cfg.scan.benchmark_mode, BenchmarkMode::Strict);
        assert_eq!(
            cfg.report.output_location,
            PathBuf::from("/var/bearwatch/reports")
        );
        assert_eq!(cfg.report.max_reports, 4);
        // Unspecified section falls back to defaults.
        assert!(cfg.log.enabled);
    }

    #[test]
    fn explicit_missing_path_errors() {
        let err = Config::load(Some(Path::new("/no/such/config.toml"))).unwrap_err();
        assert_eq!(err.code(), "BW-1002");
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "= not toml").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert_eq!(err.code(), "BW-1003");
    }

    #[test]
    fn zero_max_reports_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[report]\nmax_reports = 0\n").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert_eq!(err.code(), "BW-1001");
    }

    #[test]
    fn save_round_trips() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.config_file = path.clone();
        cfg.scan.max_depth = 7;
        cfg.scan.last_scan_timestamp = Some(123);
        cfg.report.max_reports = 3;
        cfg.save().unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.scan.max_depth, 7);
        assert_eq!(loaded.scan.last_scan_timestamp, Some(123));
        assert_eq!(loaded.report.max_reports, 3);
    }

    #[test]
    fn scan_config_mirrors_scan_section() {
        let mut cfg = Config::default();
        cfg.scan.root_paths = vec![PathBuf::from("/etc")];
        cfg.scan.incremental_scan = true;
        cfg.scan.last_scan_timestamp = Some(42);
        let scan = cfg.scan_config();
        assert_eq!(scan.root_paths, vec![PathBuf::from("/etc")]);
        assert!(scan.incremental_scan);
        assert_eq!(scan.last_scan_timestamp, Some(42));
        assert_eq!(scan.benchmark_mode, BenchmarkMode::Legacy);
    }
}
