//! Platform abstraction: mount enumeration, distro detection, WSL awareness.
//!
//! These collaborators only feed configuration values (candidate scan roots)
//! into the audit core; the core never calls back into them.

#![allow(missing_docs)]

use std::fs;
use std::path::PathBuf;

/// One mounted filesystem from the mount table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPoint {
    pub device: String,
    pub path: PathBuf,
    pub fs_type: String,
}

/// Coarse distro family, used only to pick safe default scan roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistroFamily {
    Debian,
    RedHat,
    Arch,
    Other,
}

/// Filesystem types that never hold user files worth auditing.
const PSEUDO_FS: &[&str] = &[
    "proc", "sysfs", "devtmpfs", "devpts", "tmpfs", "cgroup", "cgroup2", "overlay", "squashfs",
    "securityfs", "debugfs", "tracefs", "fusectl", "configfs", "pstore", "bpf", "autofs",
    "hugetlbfs", "mqueue", "binfmt_misc", "rpc_pipefs", "nsfs",
];

/// Whether we are running under Windows Subsystem for Linux.
#[must_use]
pub fn is_wsl() -> bool {
    fs::read_to_string("/proc/version")
        .map(|v| v.to_lowercase().contains("microsoft"))
        .unwrap_or(false)
}

/// Enumerate scannable mount points from `/proc/mounts`.
///
/// Pseudo-filesystems are filtered out, and under WSL the `/mnt/*` Windows
/// drives are excluded — their permission bits are synthetic and would drown
/// the report in noise.
pub fn mount_points() -> Vec<MountPoint> {
    fs::read_to_string("/proc/mounts")
        .map(|raw| parse_mounts(&raw, is_wsl()))
        .unwrap_or_default()
}

/// Parse a mount table in `/proc/mounts` format.
fn parse_mounts(raw: &str, wsl: bool) -> Vec<MountPoint> {
    let mut mounts = Vec::new();
    for line in raw.lines() {
        let mut fields = line.split_whitespace();
        let (Some(device), Some(path), Some(fs_type)) =
            (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };
        if PSEUDO_FS.contains(&fs_type) {
            continue;
        }
        if wsl && path.starts_with("/mnt/") {
            continue;
        }
        mounts.push(MountPoint {
            device: device.to_string(),
            // Octal escapes (\040 for space) left as-is; scan roots with
            // spaces are not expected in practice.
            path: PathBuf::from(path),
            fs_type: fs_type.to_string(),
        });
    }
    mounts
}

/// Detect the distro family from `/etc/os-release`.
#[must_use]
pub fn distro_family() -> DistroFamily {
    fs::read_to_string("/etc/os-release")
        .map(|raw| parse_os_release(&raw))
        .unwrap_or(DistroFamily::Other)
}

fn parse_os_release(raw: &str) -> DistroFamily {
    let mut id = "";
    let mut id_like = "";
    for line in raw.lines() {
        if let Some(value) = line.strip_prefix("ID=") {
            id = value.trim_matches('"');
        } else if let Some(value) = line.strip_prefix("ID_LIKE=") {
            id_like = value.trim_matches('"');
        }
    }
    family_of(id).unwrap_or_else(|| {
        id_like
            .split_whitespace()
            .find_map(family_of)
            .unwrap_or(DistroFamily::Other)
    })
}

fn family_of(id: &str) -> Option<DistroFamily> {
    match id {
        "ubuntu" | "debian" => Some(DistroFamily::Debian),
        "centos" | "rhel" | "redhat" | "fedora" => Some(DistroFamily::RedHat),
        "arch" => Some(DistroFamily::Arch),
        _ => None,
    }
}

/// Safe default scan roots for a distro family.
#[must_use]
pub fn safe_default_roots(family: DistroFamily) -> Vec<PathBuf> {
    let roots: &[&str] = match family {
        DistroFamily::Debian => &["/home", "/etc", "/var"],
        DistroFamily::RedHat => &["/home", "/etc", "/var", "/usr/local"],
        DistroFamily::Arch => &["/home", "/etc", "/usr"],
        DistroFamily::Other => &["/home", "/etc"],
    };
    roots.iter().map(PathBuf::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_MOUNTS: &str = "\
sysfs /sys sysfs rw,nosuid,nodev,noexec 0 0
proc /proc proc rw,nosuid,nodev,noexec 0 0
/dev/sda2 / ext4 rw,relatime 0 0
/dev/sda1 /boot vfat rw,relatime 0 0
tmpfs /tmp tmpfs rw,nosuid,nodev 0 0
C:\\134 /mnt/c 9p rw,noatime 0 0
/dev/sdb1 /data xfs rw,relatime 0 0
";

    #[test]
    fn parse_mounts_filters_pseudo_filesystems() {
        let mounts = parse_mounts(SAMPLE_MOUNTS, false);
        let paths: Vec<&str> = mounts.iter().filter_map(|m| m.path.to_str()).collect();
        assert!(paths.contains(&"/"));
        assert!(paths.contains(&"/boot"));
        assert!(paths.contains(&"/data"));
        assert!(!paths.contains(&"/sys"));
        assert!(!paths.contains(&"/proc"));
        assert!(!paths.contains(&"/tmp"));
    }

    #[test]
    fn parse_mounts_excludes_windows_drives_under_wsl() {
        let mounts = parse_mounts(SAMPLE_MOUNTS, true);
        assert!(!mounts.iter().any(|m| m.path.starts_with("/mnt/c")));
        // Native mounts are unaffected.
        assert!(mounts.iter().any(|m| m.path == PathBuf::from("/data")));
    }

    #[test]
    fn parse_mounts_keeps_windows_drives_outside_wsl() {
        let mounts = parse_mounts(SAMPLE_MOUNTS, false);
        assert!(mounts.iter().any(|m| m.path == PathBuf::from("/mnt/c")));
    }

    #[test]
    fn parse_mounts_tolerates_short_lines() {
        let mounts = parse_mounts("garbage\n/dev/sda1 /ok ext4 rw 0 0\n", false);
        assert_eq!(mounts.len(), 1);
        assert_eq!(mounts[0].fs_type, "ext4");
    }

    #[test]
    fn os_release_id_takes_priority() {
        let raw = "NAME=\"Ubuntu\"\nID=ubuntu\nID_LIKE=debian\n";
        assert_eq!(parse_os_release(raw), DistroFamily::Debian);
    }

    #[test]
    fn os_release_falls_back_to_id_like() {
        let raw = "ID=linuxmint\nID_LIKE=\"ubuntu debian\"\n";
        assert_eq!(parse_os_release(raw), DistroFamily::Debian);
    }

    #[test]
    fn unknown_distro_maps_to_other() {
        assert_eq!(parse_os_release("ID=gentoo\n"), DistroFamily::Other);
        assert_eq!(parse_os_release(""), DistroFamily::Other);
    }

    #[test]
    fn safe_defaults_per_family() {
        assert_eq!(
            safe_default_roots(DistroFamily::RedHat),
            vec![
                PathBuf::from("/home"),
                PathBuf::from("/etc"),
                PathBuf::from("/var"),
                PathBuf::from("/usr/local"),
            ]
        );
        assert_eq!(safe_default_roots(DistroFamily::Other).len(), 2);
    }
}
