//! Risk finding and summary types shared by the classifier, report builder,
//! and CLI output paths.

#![allow(missing_docs)]

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Permission mode bit for "other" write access.
pub const MODE_WORLD_WRITABLE: u32 = 0o002;
/// Permission mode bit for set-user-ID execution.
pub const MODE_SUID: u32 = 0o4000;
/// Permission mode bit for set-group-ID execution.
pub const MODE_SGID: u32 = 0o2000;

/// One category of permission risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskKind {
    WorldWritable,
    Suid,
    Sgid,
}

impl RiskKind {
    /// Label used in report text and JSON output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::WorldWritable => "world-writable",
            Self::Suid => "SUID",
            Self::Sgid => "SGID",
        }
    }
}

impl fmt::Display for RiskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The three raw permission predicates evaluated for every visited file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PermissionBits {
    pub world_writable: bool,
    pub suid: bool,
    pub sgid: bool,
}

impl PermissionBits {
    /// Decode the predicates from a raw `st_mode` value.
    #[must_use]
    pub const fn from_mode(mode: u32) -> Self {
        Self {
            world_writable: mode & MODE_WORLD_WRITABLE != 0,
            suid: mode & MODE_SUID != 0,
            sgid: mode & MODE_SGID != 0,
        }
    }

    /// Whether any predicate is set.
    #[must_use]
    pub const fn any(self) -> bool {
        self.world_writable || self.suid || self.sgid
    }

    /// The set of true predicates, in stable report order.
    #[must_use]
    pub fn kinds(self) -> Vec<RiskKind> {
        let mut kinds = Vec::with_capacity(3);
        if self.world_writable {
            kinds.push(RiskKind::WorldWritable);
        }
        if self.suid {
            kinds.push(RiskKind::Suid);
        }
        if self.sgid {
            kinds.push(RiskKind::Sgid);
        }
        kinds
    }
}

/// A single classified permission risk.
///
/// Invariant: `kinds` is never empty — constructors enforce it, so a finding
/// always names at least one risk category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFinding {
    pub path: PathBuf,
    pub kinds: Vec<RiskKind>,
    /// Rule explanation, present only for strict (benchmark) policy findings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RiskFinding {
    /// Build a finding; returns `None` when `kinds` is empty, upholding the
    /// non-empty invariant at the only construction site.
    #[must_use]
    pub fn new(path: PathBuf, kinds: Vec<RiskKind>, reason: Option<String>) -> Option<Self> {
        if kinds.is_empty() {
            return None;
        }
        Some(Self {
            path,
            kinds,
            reason,
        })
    }

    /// Comma-joined kind labels for report text.
    #[must_use]
    pub fn kinds_label(&self) -> String {
        self.kinds
            .iter()
            .map(|k| k.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Per-kind counters over all findings of one scan.
///
/// Each counter equals the number of findings whose `kinds` contains that
/// kind; `total` is the number of findings. `record` is the only mutator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanSummary {
    pub world_writable: usize,
    pub suid: usize,
    pub sgid: usize,
    pub total: usize,
}

impl ScanSummary {
    /// Fold one finding into the counters.
    pub fn record(&mut self, finding: &RiskFinding) {
        for kind in &finding.kinds {
            match kind {
                RiskKind::WorldWritable => self.world_writable += 1,
                RiskKind::Suid => self.suid += 1,
                RiskKind::Sgid => self.sgid += 1,
            }
        }
        self.total += 1;
    }

    /// Whether the scan found nothing risky.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.total == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn permission_bits_decode_mode() {
        let bits = PermissionBits::from_mode(0o100_666);
        assert!(bits.world_writable);
        assert!(!bits.suid);
        assert!(!bits.sgid);

        let bits = PermissionBits::from_mode(0o104_755);
        assert!(bits.suid);
        assert!(!bits.world_writable);

        let bits = PermissionBits::from_mode(0o102_755);
        assert!(bits.sgid);
    }

    #[test]
    fn safe_mode_has_no_predicates() {
        let bits = PermissionBits::from_mode(0o100_644);
        assert!(!bits.any());
        assert!(bits.kinds().is_empty());
    }

    #[test]
    fn kinds_are_in_stable_order() {
        let bits = PermissionBits {
            world_writable: true,
            suid: true,
            sgid: true,
        };
        assert_eq!(
            bits.kinds(),
            vec![RiskKind::WorldWritable, RiskKind::Suid, RiskKind::Sgid]
        );
    }

    #[test]
    fn finding_rejects_empty_kind_set() {
        assert!(RiskFinding::new(PathBuf::from("/tmp/x"), vec![], None).is_none());
        assert!(RiskFinding::new(PathBuf::from("/tmp/x"), vec![RiskKind::Suid], None).is_some());
    }

    #[test]
    fn kinds_label_joins_with_commas() {
        let finding = RiskFinding::new(
            PathBuf::from("/tmp/x"),
            vec![RiskKind::WorldWritable, RiskKind::Sgid],
            None,
        )
        .unwrap();
        assert_eq!(finding.kinds_label(), "world-writable, SGID");
    }

    #[test]
    fn summary_counts_match_membership() {
        let mut summary = ScanSummary::default();
        let a = RiskFinding::new(
            PathBuf::from("/a"),
            vec![RiskKind::WorldWritable, RiskKind::Suid],
            None,
        )
        .unwrap();
        let b = RiskFinding::new(PathBuf::from("/b"), vec![RiskKind::Suid], None).unwrap();
        summary.record(&a);
        summary.record(&b);

        assert_eq!(summary.world_writable, 1);
        assert_eq!(summary.suid, 2);
        assert_eq!(summary.sgid, 0);
        assert_eq!(summary.total, 2);
        assert!(!summary.is_clean());
    }

    proptest! {
        /// For any sequence of findings, per-kind counters equal the number of
        /// findings containing that kind and `total` equals the sequence length.
        #[test]
        fn summary_counts_equal_kind_membership(
            flags in proptest::collection::vec((any::<bool>(), any::<bool>(), any::<bool>()), 0..64)
        ) {
            let mut summary = ScanSummary::default();
            let mut findings = Vec::new();
            for (i, (ww, suid, sgid)) in flags.iter().copied().enumerate() {
                let bits = PermissionBits { world_writable: ww, suid, sgid };
                if let Some(f) = RiskFinding::new(PathBuf::from(format!("/f{i}")), bits.kinds(), None) {
                    summary.record(&f);
                    findings.push(f);
                }
            }

            let count = |kind: RiskKind| findings.iter().filter(|f| f.kinds.contains(&kind)).count();
            prop_assert_eq!(summary.world_writable, count(RiskKind::WorldWritable));
            prop_assert_eq!(summary.suid, count(RiskKind::Suid));
            prop_assert_eq!(summary.sgid, count(RiskKind::Sgid));
            prop_assert_eq!(summary.total, findings.len());
        }
    }
}
