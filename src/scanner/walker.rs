//! Depth-first directory traversal with depth, symlink, and incremental guards.
//!
//! The walker is the "eyes" of the audit: it visits every regular file under
//! the configured roots and hands each one to the caller for classification.
//! It is deliberately single-threaded and synchronous — one scan, one pass,
//! deterministic visit order within each directory listing.

#![allow(missing_docs)]

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::errors::{BwError, Result};

/// Walker configuration derived from `ScanConfig`.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    pub root_paths: Vec<PathBuf>,
    pub max_depth: usize,
    pub incremental_scan: bool,
    /// Unix-seconds cutoff from the previous scan; files modified strictly
    /// earlier are skipped when `incremental_scan` is set.
    pub last_scan_timestamp: Option<u64>,
}

/// Immutable per-recursion context: everything a recursive step needs beyond
/// the directory it is visiting. Built once per walk, threaded down unchanged.
#[derive(Debug, Clone, Copy)]
struct WalkContext {
    max_depth: usize,
    incremental_cutoff: Option<u64>,
}

/// A regular file surfaced to the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    /// Raw `st_mode` bits (type + permission).
    pub mode: u32,
    /// Modification time in unix seconds.
    pub mtime: u64,
}

/// Counters accumulated over one walk.
///
/// Symlinks are observed as their own entry (counted here) but never followed
/// and never classified. Access-denied directories and per-entry stat
/// failures are recovered: counted, warned, traversal continues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub files_visited: u64,
    pub dirs_visited: u64,
    pub symlinks_seen: u64,
    pub skipped_unmodified: u64,
    pub access_denied: u64,
    pub stat_anomalies: u64,
}

/// Single-threaded depth-first walker.
pub struct DirectoryWalker {
    config: WalkerConfig,
}

impl DirectoryWalker {
    #[must_use]
    pub fn new(config: WalkerConfig) -> Self {
        Self { config }
    }

    /// Validate roots before any traversal: an explicitly-specified root that
    /// does not exist aborts the scan cleanly, producing no partial report.
    pub fn validate_roots(&self) -> Result<()> {
        if self.config.root_paths.is_empty() {
            return Err(BwError::InvalidConfig {
                details: "no scan roots configured".to_string(),
            });
        }
        for root in &self.config.root_paths {
            if !root.exists() {
                return Err(BwError::InvalidConfig {
                    details: format!("scan root does not exist: {}", root.display()),
                });
            }
        }
        Ok(())
    }

    /// Walk all roots depth-first, invoking `visit` for each regular file
    /// that passes the incremental filter. Returns accumulated stats.
    pub fn walk(&self, visit: &mut dyn FnMut(FileEntry)) -> Result<WalkStats> {
        self.validate_roots()?;

        let ctx = WalkContext {
            max_depth: self.config.max_depth,
            incremental_cutoff: if self.config.incremental_scan {
                self.config.last_scan_timestamp
            } else {
                None
            },
        };

        let mut stats = WalkStats::default();
        for root in &self.config.root_paths {
            walk_dir(root, 0, ctx, &mut stats, visit);
        }
        Ok(stats)
    }
}

/// Recursive step: list one directory, classify its files, recurse into its
/// subdirectories at `depth + 1`. A depth past the limit skips the branch.
fn walk_dir(
    dir: &Path,
    depth: usize,
    ctx: WalkContext,
    stats: &mut WalkStats,
    visit: &mut dyn FnMut(FileEntry),
) {
    if depth > ctx.max_depth {
        return;
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::PermissionDenied => {
            stats.access_denied += 1;
            eprintln!("[BW-SCANNER] WARNING: permission denied for {}", dir.display());
            return;
        }
        Err(err) if err.kind() == ErrorKind::NotFound => return,
        Err(err) => {
            // Unreadable for any other reason: recover the same way.
            stats.access_denied += 1;
            eprintln!("[BW-SCANNER] WARNING: cannot open {}: {err}", dir.display());
            return;
        }
    };

    stats.dirs_visited += 1;

    for entry_result in entries {
        let Ok(entry) = entry_result else {
            stats.stat_anomalies += 1;
            continue;
        };

        let Ok(file_type) = entry.file_type() else {
            stats.stat_anomalies += 1;
            continue;
        };

        // Symlinks are their own non-traversed entry: noted, never followed
        // (prevents cycles), never classified as their target.
        if file_type.is_symlink() {
            stats.symlinks_seen += 1;
            continue;
        }

        let path = entry.path();

        if file_type.is_dir() {
            walk_dir(&path, depth + 1, ctx, stats, visit);
            continue;
        }

        if !file_type.is_file() {
            continue; // Sockets, fifos, devices: out of scope.
        }

        let meta = match entry.metadata() {
            Ok(meta) => meta,
            Err(_) => {
                // Unexpected stat failure on a single entry: skip, never fatal.
                stats.stat_anomalies += 1;
                continue;
            }
        };

        let mtime = unix_seconds(meta.modified().unwrap_or(UNIX_EPOCH));
        if let Some(cutoff) = ctx.incremental_cutoff
            && mtime < cutoff
        {
            stats.skipped_unmodified += 1;
            continue;
        }

        stats.files_visited += 1;
        visit(FileEntry {
            path,
            mode: mode_bits(&meta),
            mtime,
        });
    }
}

fn unix_seconds(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs())
}

fn mode_bits(meta: &fs::Metadata) -> u32 {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        meta.mode()
    }
    #[cfg(not(unix))]
    {
        let _ = meta;
        0
    }
}
