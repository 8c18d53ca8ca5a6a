//! Volume discovery and selection
//!
//! A volume is the root of an independently searchable tree: a drive
//! letter on Windows, a mount point elsewhere. The set searched during a
//! run is fixed once [`plan`] has been applied.

use crate::config::schema::VolumesConfig;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Root of a searchable filesystem tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Volume {
    root: PathBuf,
}

impl Volume {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Comparison key: trailing separators dropped, case folded on Windows
    fn key(&self) -> String {
        normalize(&self.root)
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root.display())
    }
}

/// Where the candidate volumes came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeSource {
    /// `--volume` flags
    Cli,
    /// `[volumes] include` in the config
    Config,
    /// Mounted volumes found on this machine
    Discovered,
}

impl fmt::Display for VolumeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cli => "command line",
            Self::Config => "config",
            Self::Discovered => "discovered",
        };
        write!(f, "{}", name)
    }
}

/// Volumes to search plus the ones left out
#[derive(Debug, Clone, Serialize)]
pub struct VolumeSelection {
    pub source: VolumeSource,
    pub searched: Vec<Volume>,
    pub excluded: Vec<Volume>,
}

impl VolumeSelection {
    /// Move `volumes` from the searched set to the excluded set
    pub fn exclude(&mut self, volumes: &[Volume]) {
        let keys: Vec<String> = volumes.iter().map(Volume::key).collect();
        let (dropped, kept): (Vec<Volume>, Vec<Volume>) = std::mem::take(&mut self.searched)
            .into_iter()
            .partition(|v| keys.contains(&v.key()));
        self.searched = kept;
        self.excluded.extend(dropped);
    }
}

/// Decide which volumes a run searches.
///
/// `--volume` flags win over `[volumes] include`, which wins over
/// discovery. Configured exclusions apply only to discovered volumes so an
/// explicitly named volume is never silently dropped; `--exclude` always
/// applies.
pub fn plan(config: &VolumesConfig, cli_include: &[PathBuf], cli_exclude: &[PathBuf]) -> VolumeSelection {
    let (source, candidates) = if !cli_include.is_empty() {
        (VolumeSource::Cli, cli_include.iter().map(Volume::new).collect())
    } else if !config.include.is_empty() {
        (VolumeSource::Config, config.include.iter().map(Volume::new).collect())
    } else {
        (VolumeSource::Discovered, discover())
    };

    let mut exclusions: Vec<String> = cli_exclude.iter().map(|p| normalize(p)).collect();
    if source == VolumeSource::Discovered {
        exclusions.extend(config.exclude.iter().map(|p| normalize(p)));
    }

    let mut selection = VolumeSelection {
        source,
        searched: vec![],
        excluded: vec![],
    };
    for volume in dedup(candidates) {
        if exclusions.contains(&volume.key()) {
            debug!("Excluding volume {}", volume);
            selection.excluded.push(volume);
        } else {
            selection.searched.push(volume);
        }
    }
    selection
}

fn dedup(volumes: Vec<Volume>) -> Vec<Volume> {
    let mut seen = Vec::new();
    volumes
        .into_iter()
        .filter(|v| {
            let key = v.key();
            if seen.contains(&key) {
                false
            } else {
                seen.push(key);
                true
            }
        })
        .collect()
}

fn normalize(path: &Path) -> String {
    let text = path.to_string_lossy();
    let trimmed = text.trim_end_matches(['/', '\\']);
    let trimmed = if trimmed.is_empty() || trimmed.ends_with(':') {
        // keep roots like "/" and "C:\" distinct from the empty string
        text.as_ref()
    } else {
        trimmed
    };
    if cfg!(windows) {
        trimmed.replace('/', "\\").to_lowercase()
    } else {
        trimmed.to_string()
    }
}

/// All mounted volumes on this machine
#[cfg(windows)]
pub fn discover() -> Vec<Volume> {
    (b'A'..=b'Z')
        .map(|letter| format!("{}:\\", letter as char))
        .filter(|root| Path::new(root).exists())
        .map(Volume::new)
        .collect()
}

/// All mounted volumes on this machine
#[cfg(not(windows))]
pub fn discover() -> Vec<Volume> {
    match std::fs::read_to_string("/proc/self/mounts") {
        Ok(table) => {
            let mounts = parse_mounts(&table);
            if mounts.is_empty() {
                vec![Volume::new("/")]
            } else {
                mounts.into_iter().map(Volume::new).collect()
            }
        }
        Err(e) => {
            debug!("Mount table unavailable ({}), falling back to / and /Volumes", e);
            let mut volumes = vec![Volume::new("/")];
            if let Ok(entries) = std::fs::read_dir("/Volumes") {
                volumes.extend(
                    entries
                        .filter_map(|entry| entry.ok())
                        .map(|entry| entry.path())
                        .filter(|path| path.is_dir())
                        .map(Volume::new),
                );
            }
            volumes
        }
    }
}

/// Filesystems that never hold user files
const PSEUDO_FILESYSTEMS: &[&str] = &[
    "autofs",
    "binfmt_misc",
    "bpf",
    "cgroup",
    "cgroup2",
    "configfs",
    "debugfs",
    "devpts",
    "devtmpfs",
    "efivarfs",
    "fusectl",
    "hugetlbfs",
    "mqueue",
    "nsfs",
    "proc",
    "pstore",
    "ramfs",
    "rpc_pipefs",
    "securityfs",
    "squashfs",
    "sysfs",
    "tmpfs",
    "tracefs",
];

/// Kernel-owned trees skipped regardless of filesystem type
const SYSTEM_PREFIXES: &[&str] = &["/proc", "/sys", "/dev", "/run"];

/// Extract searchable mount points from a `/proc/mounts` style table
pub fn parse_mounts(table: &str) -> Vec<PathBuf> {
    table
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let _device = fields.next()?;
            let mount_point = fields.next()?;
            let fs_type = fields.next()?;
            Some((unescape_mount(mount_point), fs_type))
        })
        .filter(|(_, fs_type)| !PSEUDO_FILESYSTEMS.contains(fs_type))
        .filter(|(mount_point, _)| {
            !SYSTEM_PREFIXES
                .iter()
                .any(|prefix| Path::new(mount_point).starts_with(prefix))
        })
        .map(|(mount_point, _)| PathBuf::from(mount_point))
        .collect()
}

/// Decode the octal escapes (`\040` for space) used in mount tables
fn unescape_mount(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() {
            let digits = &bytes[i + 1..i + 4];
            if digits.iter().all(|b| (b'0'..=b'7').contains(b)) {
                let value = digits.iter().fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
                if let Ok(value) = u8::try_from(value) {
                    out.push(value);
                    i += 4;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOUNTS: &str = "\
sysfs /sys sysfs rw,nosuid,nodev,noexec,relatime 0 0
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
/dev/nvme0n1p2 / ext4 rw,relatime 0 0
tmpfs /run tmpfs rw,nosuid,nodev 0 0
/dev/sda1 /mnt/backup\\040disk ext4 rw,relatime 0 0
/dev/sdb1 /media/usb vfat rw,relatime 0 0
/dev/loop3 /snap/core/1 squashfs ro 0 0
portal /run/user/1000/doc fuse.portal rw 0 0
";

    #[test]
    fn parse_mounts_skips_pseudo_filesystems() {
        let mounts = parse_mounts(MOUNTS);
        assert_eq!(
            mounts,
            vec![
                PathBuf::from("/"),
                PathBuf::from("/mnt/backup disk"),
                PathBuf::from("/media/usb"),
            ]
        );
    }

    #[test]
    fn parse_mounts_ignores_short_lines() {
        assert!(parse_mounts("garbage\n\n").is_empty());
    }

    #[test]
    fn unescape_handles_trailing_backslash() {
        assert_eq!(unescape_mount("a\\040b"), "a b");
        assert_eq!(unescape_mount("odd\\"), "odd\\");
        assert_eq!(unescape_mount("x\\09"), "x\\09");
    }

    fn config(include: &[&str], exclude: &[&str]) -> VolumesConfig {
        VolumesConfig {
            include: include.iter().map(PathBuf::from).collect(),
            exclude: exclude.iter().map(PathBuf::from).collect(),
            prompt: false,
        }
    }

    #[test]
    fn cli_volumes_win_and_ignore_config_exclusions() {
        let cfg = config(&["/from/config"], &["/data"]);
        let selection = plan(&cfg, &[PathBuf::from("/data")], &[]);

        assert_eq!(selection.source, VolumeSource::Cli);
        assert_eq!(selection.searched, vec![Volume::new("/data")]);
        assert!(selection.excluded.is_empty());
    }

    #[test]
    fn cli_exclusions_always_apply() {
        let cfg = config(&["/a", "/b/"], &[]);
        let selection = plan(&cfg, &[], &[PathBuf::from("/b")]);

        assert_eq!(selection.source, VolumeSource::Config);
        assert_eq!(selection.searched, vec![Volume::new("/a")]);
        assert_eq!(selection.excluded, vec![Volume::new("/b/")]);
    }

    #[test]
    fn duplicate_volumes_are_collapsed() {
        let selection = plan(
            &config(&[], &[]),
            &[PathBuf::from("/a"), PathBuf::from("/a/"), PathBuf::from("/b")],
            &[],
        );
        assert_eq!(selection.searched, vec![Volume::new("/a"), Volume::new("/b")]);
    }

    #[test]
    fn exclude_moves_volumes() {
        let mut selection = plan(
            &config(&[], &[]),
            &[PathBuf::from("/a"), PathBuf::from("/b")],
            &[],
        );
        selection.exclude(&[Volume::new("/a/")]);

        assert_eq!(selection.searched, vec![Volume::new("/b")]);
        assert_eq!(selection.excluded, vec![Volume::new("/a")]);
    }

    #[test]
    fn root_keeps_its_separator() {
        assert_eq!(Volume::new("/").key(), normalize(Path::new("/")));
        assert_ne!(Volume::new("/").key(), "");
    }

    #[test]
    fn discover_finds_something() {
        assert!(!discover().is_empty());
    }
}
