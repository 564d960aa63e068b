//! Shared path manipulation utilities.

use std::env;
use std::path::{Component, Path, PathBuf};

/// Resolve a user-supplied path (scan root, output directory) to an absolute,
/// normalized form.
///
/// A leading `~` is expanded first. A path that exists goes through
/// `fs::canonicalize`, resolving symlinks; one that does not yet exist is made
/// absolute against the current directory with `..`/`.` folded syntactically,
/// so a report can be written to a directory created later.
pub fn resolve_absolute_path(path: &Path) -> PathBuf {
    let expanded = expand_home(path);
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        match env::current_dir() {
            Ok(cwd) => cwd.join(expanded),
            Err(_) => expanded,
        }
    };

    std::fs::canonicalize(&absolute).unwrap_or_else(|_| normalize_syntactic(&absolute))
}

/// Expand a leading `~` or `~/` to the user's home directory.
///
/// Paths without a leading tilde are returned unchanged. When `HOME` is unset
/// the tilde is left literal rather than guessed.
pub fn expand_home(path: &Path) -> PathBuf {
    let Some(s) = path.to_str() else {
        return path.to_path_buf();
    };
    let Some(home) = env::var_os("HOME") else {
        return path.to_path_buf();
    };
    if s == "~" {
        return PathBuf::from(home);
    }
    s.strip_prefix("~/")
        .map_or_else(|| path.to_path_buf(), |rest| PathBuf::from(home).join(rest))
}

fn normalize_syntactic(path: &Path) -> PathBuf {
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(..) | Component::RootDir | Component::Normal(_) => {
                components.push(component);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if let Some(Component::Normal(_)) = components.last() {
                    components.pop();
                }
            }
        }
    }
    components.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_existing_path_canonically() {
        let cwd = env::current_dir().unwrap();
        let resolved = resolve_absolute_path(Path::new("."));
        assert_eq!(resolved, std::fs::canonicalize(&cwd).unwrap());
    }

    #[test]
    fn normalizes_nonexistent_path_syntactically() {
        // /nonexistent/foo/../bar -> /nonexistent/bar
        #[cfg(unix)]
        let root = Path::new("/");
        #[cfg(windows)]
        let root = Path::new("C:");

        let input = root.join("nonexistent").join("foo").join("..").join("bar");
        let expected = root.join("nonexistent").join("bar");

        assert!(std::fs::canonicalize(&input).is_err());

        let resolved = resolve_absolute_path(&input);
        assert_eq!(resolved, expected);
    }

    #[test]
    fn handles_parent_at_root() {
        #[cfg(unix)]
        {
            let input = Path::new("/../foo");
            let resolved = normalize_syntactic(input);
            assert_eq!(resolved, Path::new("/foo"));
        }
    }

    #[test]
    fn resolve_expands_tilde_before_absolutizing() {
        if let Some(home) = env::var_os("HOME") {
            let resolved = resolve_absolute_path(Path::new("~/no-such-subdir/reports"));
            assert!(resolved.is_absolute());
            assert!(resolved.starts_with(PathBuf::from(home)));
            assert!(resolved.ends_with("no-such-subdir/reports"));
        }
    }

    #[test]
    fn expands_leading_tilde() {
        if let Some(home) = env::var_os("HOME") {
            let expanded = expand_home(Path::new("~/reports"));
            assert_eq!(expanded, PathBuf::from(home).join("reports"));
        }
    }

    #[test]
    fn leaves_plain_paths_alone() {
        assert_eq!(expand_home(Path::new("/var/reports")), Path::new("/var/reports"));
        assert_eq!(expand_home(Path::new("reports~")), Path::new("reports~"));
    }
}
