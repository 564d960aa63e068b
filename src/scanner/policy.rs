//! Risk classification policies.
//!
//! Exactly one policy is selected at scan start and applied uniformly for the
//! whole run. The legacy OR-rule set is the canonical contract; the strict
//! policy expresses the CIS-style checks as an explicit disallow-rule table
//! where each violated rule emits its own finding with a reason.

#![allow(missing_docs)]

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::errors::{BwError, Result};
use crate::scanner::findings::{PermissionBits, RiskFinding, RiskKind};

/// Which rule set a scan applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BenchmarkMode {
    /// Boolean OR-rule: one finding per risky file, kinds = true predicates.
    #[default]
    Legacy,
    /// CIS-style disallow rules: one finding per violated rule, with reason.
    Strict,
}

impl BenchmarkMode {
    /// Parse from a config/CLI string.
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "strict" | "cis" => Ok(Self::Strict),
            other => Err(BwError::InvalidConfig {
                details: format!("unknown benchmark mode {other:?} (expected legacy or strict)"),
            }),
        }
    }

    /// Instantiate the matching policy.
    #[must_use]
    pub fn policy(self) -> Box<dyn RiskPolicy> {
        match self {
            Self::Legacy => Box::new(LegacyPolicy),
            Self::Strict => Box::new(StrictPolicy::default()),
        }
    }
}

/// A rule set that turns a file's permission bits into zero or more findings.
pub trait RiskPolicy {
    /// Policy name used in report headers and logs.
    fn name(&self) -> &'static str;

    /// Classify one file. Returns an empty vec for compliant files.
    fn classify(&self, path: &Path, mode: u32) -> Vec<RiskFinding>;
}

/// The original OR-rule: any true predicate makes the file risky, and the
/// single finding carries exactly the set of true predicates.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyPolicy;

impl RiskPolicy for LegacyPolicy {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn classify(&self, path: &Path, mode: u32) -> Vec<RiskFinding> {
        let bits = PermissionBits::from_mode(mode);
        if !bits.any() {
            return Vec::new();
        }
        RiskFinding::new(path.to_path_buf(), bits.kinds(), None)
            .into_iter()
            .collect()
    }
}

/// One entry in the strict disallow table.
struct DisallowRule {
    reason: &'static str,
    violated: fn(PermissionBits) -> bool,
    kinds: fn(PermissionBits) -> Vec<RiskKind>,
}

/// Stricter benchmark rule set. Each violated rule emits its own finding, so
/// a file that is both world-writable and setuid yields two findings.
pub struct StrictPolicy {
    rules: Vec<DisallowRule>,
}

impl Default for StrictPolicy {
    fn default() -> Self {
        Self {
            rules: vec![
                DisallowRule {
                    reason: "SUID/SGID permissions set",
                    violated: |bits| bits.suid || bits.sgid,
                    kinds: |bits| {
                        let mut kinds = Vec::with_capacity(2);
                        if bits.suid {
                            kinds.push(RiskKind::Suid);
                        }
                        if bits.sgid {
                            kinds.push(RiskKind::Sgid);
                        }
                        kinds
                    },
                },
                DisallowRule {
                    reason: "World-writable file",
                    violated: |bits| bits.world_writable,
                    kinds: |_| vec![RiskKind::WorldWritable],
                },
            ],
        }
    }
}

impl RiskPolicy for StrictPolicy {
    fn name(&self) -> &'static str {
        "strict"
    }

    fn classify(&self, path: &Path, mode: u32) -> Vec<RiskFinding> {
        let bits = PermissionBits::from_mode(mode);
        self.rules
            .iter()
            .filter(|rule| (rule.violated)(bits))
            .filter_map(|rule| {
                RiskFinding::new(
                    path.to_path_buf(),
                    (rule.kinds)(bits),
                    Some(rule.reason.to_string()),
                )
            })
            .collect()
    }
}
