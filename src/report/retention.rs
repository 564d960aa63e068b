//! Report retention: bounded-count pruning, oldest first.
//!
//! Only files matching the report naming scheme are considered; anything else
//! in the output directory is left alone. Pruning is idempotent — a second
//! run with no new artifacts deletes nothing.

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::errors::{BwError, Result};
use crate::logger::{EventType, JsonlLogger, LogEntry, Severity};
use crate::report::builder::{REPORT_PREFIX, REPORT_SUFFIX};

/// How many report artifacts one output directory may hold.
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    /// Lower bound 1 is enforced by `validate`.
    pub max_reports: usize,
    pub directory: PathBuf,
}

/// What a prune pass did.
#[derive(Debug, Clone, Default)]
pub struct PruneReport {
    pub deleted: Vec<PathBuf>,
    /// Deletion failures: logged, never fatal, remaining files still pruned.
    pub failed: Vec<(PathBuf, String)>,
    /// Matching artifacts remaining after the pass.
    pub remaining: usize,
}

/// Enforces a `RetentionPolicy` over one output directory.
pub struct RetentionManager {
    policy: RetentionPolicy,
    logger: Option<JsonlLogger>,
}

impl RetentionManager {
    #[must_use]
    pub fn new(policy: RetentionPolicy) -> Self {
        Self {
            policy,
            logger: None,
        }
    }

    /// Attach an activity logger for prune events.
    #[must_use]
    pub fn with_logger(mut self, logger: JsonlLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.policy.max_reports == 0 {
            return Err(BwError::InvalidConfig {
                details: "max_reports must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Prune oldest-first until at most `max_reports` artifacts remain.
    ///
    /// A directory that does not exist yet is a no-op (nothing to prune).
    pub fn prune(&self) -> Result<PruneReport> {
        self.validate()?;

        let mut report = PruneReport::default();
        let mut artifacts = match list_artifacts(&self.policy.directory) {
            Ok(artifacts) => artifacts,
            Err(err) if err_is_not_found(&err) => return Ok(report),
            Err(err) => {
                return Err(BwError::io(&self.policy.directory, err));
            }
        };

        // Oldest first by modification time; filename (which embeds the unix
        // timestamp) breaks ties deterministically.
        artifacts.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        let excess = artifacts.len().saturating_sub(self.policy.max_reports);
        for (path, _) in artifacts.drain(..excess) {
            match fs::remove_file(&path) {
                Ok(()) => report.deleted.push(path),
                Err(err) => {
                    eprintln!(
                        "[BW-RETENTION] WARNING: could not delete {}: {err}",
                        path.display()
                    );
                    report.failed.push((path, err.to_string()));
                }
            }
        }
        report.remaining = artifacts.len() + report.failed.len();

        if let Some(logger) = &self.logger
            && !report.deleted.is_empty()
        {
            logger.append(
                LogEntry::new(EventType::ReportPruned, Severity::Info)
                    .with_path(self.policy.directory.to_string_lossy())
                    .with_count(report.deleted.len() as u64),
            );
        }

        Ok(report)
    }
}

/// List `(path, mtime)` for report artifacts in `dir`.
fn list_artifacts(dir: &Path) -> std::io::Result<Vec<(PathBuf, SystemTime)>> {
    let mut artifacts = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.starts_with(REPORT_PREFIX) || !name.ends_with(REPORT_SUFFIX) {
            continue;
        }
        let Ok(meta) = entry.metadata() else {
            continue; // Stat race: artifact vanished, skip it.
        };
        if !meta.is_file() {
            continue;
        }
        let mtime = meta.modified().unwrap_or(UNIX_EPOCH);
        artifacts.push((entry.path(), mtime));
    }
    Ok(artifacts)
}

fn err_is_not_found(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::NotFound
}
