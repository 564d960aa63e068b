//! Report lifecycle: build → persist → prune.

pub mod builder;
pub mod retention;

use std::path::{Path, PathBuf};

use crate::core::errors::BwError;
use crate::logger::{EventType, JsonlLogger, LogEntry, Severity};
use crate::report::builder::ReportArtifact;
use crate::report::retention::{PruneReport, RetentionManager, RetentionPolicy};

/// Outcome of publishing one artifact.
///
/// Both halves are carried as results: report persistence and retention are
/// housekeeping around an already-completed scan, so neither failure is
/// allowed to discard the findings the caller holds.
#[derive(Debug)]
pub struct PublishOutcome {
    /// Where the report landed, or the persistence error if the write failed.
    pub written: Result<PathBuf, BwError>,
    /// What retention did, or why it could not run (for example an unreadable
    /// output directory).
    pub prune: Result<PruneReport, BwError>,
}

/// Persist an artifact, then prune the output directory.
///
/// The write happens-before the prune by direct data dependency, so a fresh
/// artifact always exists on disk before retention considers it. Write and
/// prune failures are logged and carried in the outcome; neither aborts the
/// other.
pub fn publish(
    artifact: &ReportArtifact,
    output_location: &Path,
    explicit_path: Option<&Path>,
    max_reports: usize,
    logger: Option<&JsonlLogger>,
) -> PublishOutcome {
    let written = artifact.persist(output_location, explicit_path);

    if let Some(logger) = logger {
        match &written {
            Ok(path) => logger.append(
                LogEntry::new(EventType::ReportWritten, Severity::Info)
                    .with_path(path.to_string_lossy())
                    .with_count(artifact.summary.total as u64),
            ),
            Err(err) => logger.append(
                LogEntry::new(EventType::Error, Severity::Error)
                    .with_error_code(err.code())
                    .with_details(err.to_string()),
            ),
        }
    }

    let mut manager = RetentionManager::new(RetentionPolicy {
        max_reports,
        directory: output_location.to_path_buf(),
    });
    if let Some(logger) = logger {
        manager = manager.with_logger(logger.clone());
    }
    let prune = manager.prune();

    if let Err(err) = &prune {
        eprintln!("[BW-RETENTION] WARNING: could not prune {}: {err}", output_location.display());
        if let Some(logger) = logger {
            logger.append(
                LogEntry::new(EventType::Error, Severity::Error)
                    .with_path(output_location.to_string_lossy())
                    .with_error_code(err.code())
                    .with_details(err.to_string()),
            );
        }
    }

    PublishOutcome { written, prune }
}
