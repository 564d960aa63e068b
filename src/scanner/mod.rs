//! Traversal-and-classification pipeline.
//!
//! `Scanner` wires the depth-first walker to the risk policy selected at scan
//! start, folding findings into a running summary as files are visited. The
//! pipeline is linear per invocation: validate config, traverse/classify
//! interleaved, aggregate. Report persistence and retention live in
//! [`crate::report`] and run strictly after the scan returns.

pub mod findings;
pub mod policy;
pub mod walker;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::errors::Result;
use crate::logger::{EventType, JsonlLogger, LogEntry, Severity};
use crate::scanner::findings::{RiskFinding, ScanSummary};
use crate::scanner::policy::BenchmarkMode;
use crate::scanner::walker::{DirectoryWalker, WalkStats, WalkerConfig};

/// Immutable scan parameters, built once per invocation from external
/// configuration. There is no mutable global: collaborators hand this value
/// in and the scan never changes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Directories to audit.
    pub root_paths: Vec<PathBuf>,
    /// Recursion limit; 0 audits only entries directly under each root.
    pub max_depth: usize,
    /// Skip files unmodified since `last_scan_timestamp`.
    pub incremental_scan: bool,
    /// Unix seconds of the previous scan, if any.
    pub last_scan_timestamp: Option<u64>,
    /// Which classification rule set to apply.
    pub benchmark_mode: BenchmarkMode,
}

/// What a scan hands back to its caller, valid regardless of whether the
/// report later persists to disk.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Findings in traversal order.
    pub findings: Vec<RiskFinding>,
    pub summary: ScanSummary,
    pub stats: WalkStats,
    /// Policy name, echoed into the report header.
    pub policy: &'static str,
}

/// One-shot scan driver. Single-threaded; callers must not run two scans
/// against the same root concurrently (no internal locking is provided).
pub struct Scanner {
    config: ScanConfig,
    logger: Option<JsonlLogger>,
}

impl Scanner {
    #[must_use]
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            logger: None,
        }
    }

    /// Attach an activity logger for scan lifecycle events.
    #[must_use]
    pub fn with_logger(mut self, logger: JsonlLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Run the traversal-and-classification pipeline.
    ///
    /// `InvalidConfig` (missing root, empty root list) surfaces before any
    /// filesystem entry is visited. Access-denied directories and per-entry
    /// stat failures are recovered inside the walk and show up in `stats`.
    pub fn run(&self) -> Result<ScanOutcome> {
        let policy = self.config.benchmark_mode.policy();

        let walker = DirectoryWalker::new(WalkerConfig {
            root_paths: self.config.root_paths.clone(),
            max_depth: self.config.max_depth,
            incremental_scan: self.config.incremental_scan,
            last_scan_timestamp: self.config.last_scan_timestamp,
        });

        let mut findings: Vec<RiskFinding> = Vec::new();
        let mut summary = ScanSummary::default();

        let stats = walker.walk(&mut |entry| {
            for finding in policy.classify(&entry.path, entry.mode) {
                summary.record(&finding);
                findings.push(finding);
            }
        })?;

        if let Some(logger) = &self.logger {
            if stats.access_denied > 0 {
                logger.append(
                    LogEntry::new(EventType::AccessDenied, Severity::Warning)
                        .with_count(stats.access_denied),
                );
            }
            logger.append(
                LogEntry::new(EventType::ScanComplete, Severity::Info)
                    .with_count(summary.total as u64)
                    .with_details(format!(
                        "policy={} files={} dirs={} denied={}",
                        policy.name(),
                        stats.files_visited,
                        stats.dirs_visited,
                        stats.access_denied
                    )),
            );
        }

        Ok(ScanOutcome {
            findings,
            summary,
            stats,
            policy: policy.name(),
        })
    }
}
