#![forbid(unsafe_code)]

//! BearWatch — filesystem permission auditor.
//!
//! Walks a directory tree depth-first, classifies each file's permission bits
//! against a selected rule policy, and manages the resulting report
//! artifacts:
//! 1. **Traversal engine** — depth-limited walk, symlinks never followed,
//!    optional incremental filter
//! 2. **Risk classifier** — legacy OR-rule or strict benchmark rule set
//! 3. **Report lifecycle** — deterministic text artifact plus oldest-first
//!    retention rollover
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use bearwatch::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use bearwatch::core::config::Config;
//! use bearwatch::scanner::{ScanConfig, Scanner};
//! ```

pub mod prelude;

pub mod core;
pub mod logger;
pub mod platform;
pub mod report;
pub mod scanner;
