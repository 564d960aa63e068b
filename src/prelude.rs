//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use bearwatch::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{BwError, Result};

// Scanner
pub use crate::scanner::findings::{PermissionBits, RiskFinding, RiskKind, ScanSummary};
pub use crate::scanner::policy::{BenchmarkMode, LegacyPolicy, RiskPolicy, StrictPolicy};
pub use crate::scanner::walker::{DirectoryWalker, WalkStats, WalkerConfig};
pub use crate::scanner::{ScanConfig, ScanOutcome, Scanner};

// Report lifecycle
pub use crate::report::builder::{REPORT_PREFIX, REPORT_SUFFIX, ReportArtifact};
pub use crate::report::retention::{PruneReport, RetentionManager, RetentionPolicy};

// Platform
pub use crate::platform::pal::{DistroFamily, MountPoint, distro_family, mount_points};

// Logging
pub use crate::logger::{EventType, JsonlLogger, LogEntry, Severity};
