//! Report artifact rendering and persistence.
//!
//! The text layout (header, summary block, itemized findings, unix-timestamp
//! trailer) is the only externally observable artifact structure and is kept
//! stable for downstream tooling that parses it.

#![allow(missing_docs)]

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::core::errors::{BwError, Result};
use crate::scanner::findings::{RiskFinding, ScanSummary};

/// Filename prefix shared with the retention manager.
pub const REPORT_PREFIX: &str = "bearwatch_report_";
/// Filename suffix shared with the retention manager.
pub const REPORT_SUFFIX: &str = ".txt";

const RULER: &str = "========================================";

/// One scan's report, assembled in memory before persistence.
///
/// Timestamps are injected rather than sampled inside `render`, so rendering
/// is a pure function of the artifact's fields.
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub summary: ScanSummary,
    pub findings: Vec<RiskFinding>,
    /// Policy name echoed in the header.
    pub policy: &'static str,
    /// Human-readable scan time for the header.
    pub scan_time: DateTime<Local>,
    /// Unix seconds; also provides filename uniqueness.
    pub unix_timestamp: u64,
}

impl ReportArtifact {
    /// Assemble an artifact stamped with the current local time.
    #[must_use]
    pub fn new(summary: ScanSummary, findings: Vec<RiskFinding>, policy: &'static str) -> Self {
        let now = Local::now();
        let unix_timestamp = u64::try_from(now.timestamp()).unwrap_or(0);
        Self {
            summary,
            findings,
            policy,
            scan_time: now,
            unix_timestamp,
        }
    }

    /// Default artifact filename under `output_location`.
    #[must_use]
    pub fn default_file_name(&self) -> String {
        format!("{REPORT_PREFIX}{}{REPORT_SUFFIX}", self.unix_timestamp)
    }

    /// Render the deterministic report text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "BearWatch Report ({} policy)", self.policy);
        let _ = writeln!(
            out,
            "Scan Time: {}",
            self.scan_time.format("%Y-%m-%d %H:%M:%S")
        );
        out.push_str(RULER);
        out.push('\n');
        let _ = writeln!(out, "World-writable files: {}", self.summary.world_writable);
        let _ = writeln!(out, "SUID files: {}", self.summary.suid);
        let _ = writeln!(out, "SGID files: {}", self.summary.sgid);
        let _ = writeln!(out, "Total findings: {}", self.summary.total);
        out.push_str(RULER);
        out.push('\n');

        if self.findings.is_empty() {
            out.push_str("No risky files or directories found.\n");
        } else {
            out.push_str("Detailed Risk Report:\n");
            for finding in &self.findings {
                match &finding.reason {
                    Some(reason) => {
                        let _ = writeln!(
                            out,
                            "Path: {}, Risks: {}, Reason: {reason}",
                            finding.path.display(),
                            finding.kinds_label()
                        );
                    }
                    None => {
                        let _ = writeln!(
                            out,
                            "Path: {}, Risks: {}",
                            finding.path.display(),
                            finding.kinds_label()
                        );
                    }
                }
            }
        }

        out.push_str(RULER);
        out.push('\n');
        let _ = writeln!(out, "Unix Timestamp: {}", self.unix_timestamp);
        out
    }

    /// Persist the rendered report.
    ///
    /// Writes to `explicit_path` when given, otherwise to
    /// `{output_location}/bearwatch_report_{unix_time}.txt`, creating the
    /// output directory if absent. A write failure is recoverable: the caller
    /// still holds the in-memory findings and summary.
    pub fn persist(
        &self,
        output_location: &Path,
        explicit_path: Option<&Path>,
    ) -> Result<PathBuf> {
        let target = explicit_path.map_or_else(
            || output_location.join(self.default_file_name()),
            Path::to_path_buf,
        );

        let dir = target.parent().unwrap_or(output_location);
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|err| BwError::ReportPersist {
                path: dir.to_path_buf(),
                details: format!("cannot create output directory: {err}"),
            })?;
        }

        fs::write(&target, self.render()).map_err(|err| BwError::ReportPersist {
            path: target.clone(),
            details: err.to_string(),
        })?;

        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::findings::RiskKind;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn fixed_artifact() -> ReportArtifact {
        let mut summary = ScanSummary::default();
        let finding = RiskFinding::new(
            PathBuf::from("/tmp/evil"),
            vec![RiskKind::WorldWritable, RiskKind::Suid],
            None,
        )
        .unwrap();
        summary.record(&finding);

        ReportArtifact {
            summary,
            findings: vec![finding],
            policy: "legacy",
            scan_time: Local.with_ymd_and_hms(2024, 10, 20, 12, 0, 0).unwrap(),
            unix_timestamp: 1_729_425_600,
        }
    }

    #[test]
    fn render_layout_is_stable() {
        let text = fixed_artifact().render();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "BearWatch Report (legacy policy)");
        assert_eq!(lines[1], "Scan Time: 2024-10-20 12:00:00");
        assert_eq!(lines[2], RULER);
        assert_eq!(lines[3], "World-writable files: 1");
        assert_eq!(lines[4], "SUID files: 1");
        assert_eq!(lines[5], "SGID files: 0");
        assert_eq!(lines[6], "Total findings: 1");
        assert_eq!(lines[7], RULER);
        assert_eq!(lines[8], "Detailed Risk Report:");
        assert_eq!(lines[9], "Path: /tmp/evil, Risks: world-writable, SUID");
        assert_eq!(lines[10], RULER);
        assert_eq!(lines[11], "Unix Timestamp: 1729425600");
    }

    #[test]
    fn render_is_deterministic() {
        let artifact = fixed_artifact();
        assert_eq!(artifact.render(), artifact.render());
    }

    #[test]
    fn clean_scan_renders_placeholder() {
        let artifact = ReportArtifact {
            summary: ScanSummary::default(),
            findings: Vec::new(),
            policy: "legacy",
            scan_time: Local.with_ymd_and_hms(2024, 10, 20, 12, 0, 0).unwrap(),
            unix_timestamp: 1,
        };
        assert!(
            artifact
                .render()
                .contains("No risky files or directories found.")
        );
    }

    #[test]
    fn strict_findings_include_reason() {
        let finding = RiskFinding::new(
            PathBuf::from("/tmp/ww"),
            vec![RiskKind::WorldWritable],
            Some("World-writable file".to_string()),
        )
        .unwrap();
        let mut summary = ScanSummary::default();
        summary.record(&finding);
        let artifact = ReportArtifact {
            summary,
            findings: vec![finding],
            policy: "strict",
            scan_time: Local.with_ymd_and_hms(2024, 10, 20, 12, 0, 0).unwrap(),
            unix_timestamp: 2,
        };
        assert!(
            artifact
                .render()
                .contains("Path: /tmp/ww, Risks: world-writable, Reason: World-writable file")
        );
    }

    #[test]
    fn persist_creates_directory_and_default_name() {
        let tmp = TempDir::new().unwrap();
        let out_dir = tmp.path().join("reports");
        let artifact = fixed_artifact();

        let written = artifact.persist(&out_dir, None).unwrap();
        assert_eq!(
            written,
            out_dir.join("bearwatch_report_1729425600.txt")
        );
        assert_eq!(fs::read_to_string(&written).unwrap(), artifact.render());
    }

    #[test]
    fn persist_honors_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let explicit = tmp.path().join("custom").join("audit.txt");
        let artifact = fixed_artifact();

        let written = artifact
            .persist(tmp.path(), Some(explicit.as_path()))
            .unwrap();
        assert_eq!(written, explicit);
        assert!(explicit.exists());
    }

    #[cfg(unix)]
    #[test]
    fn persist_failure_is_recoverable_error() {
        let artifact = fixed_artifact();
        // Writing under a path whose parent is a regular file must fail.
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        fs::write(&blocker, b"x").unwrap();

        let err = artifact
            .persist(&blocker.join("sub"), None)
            .unwrap_err();
        assert_eq!(err.code(), "BW-3101");
        assert!(err.is_retryable());
        // The in-memory artifact is intact after the failure.
        assert_eq!(artifact.findings.len(), 1);
    }
}
