//! Shortcut files: reading, rewriting and discovery
//!
//! Three shortcut flavours are supported behind the [`ShortcutStore`]
//! trait:
//! - Windows shell links (`.lnk`)
//! - freedesktop entries (`.desktop`)
//! - symbolic links

mod desktop;
mod enumerate;
mod shell_link;
mod symlink;

pub use desktop::DesktopStore;
pub use enumerate::{FoundShortcut, ShortcutWalker};
pub use shell_link::LnkStore;
pub use symlink::SymlinkStore;

use crate::error::{RelinkError, RelinkResult};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of shortcut file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortcutKind {
    Lnk,
    Desktop,
    Symlink,
}

impl ShortcutKind {
    /// Kind implied by a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("lnk") {
            Some(Self::Lnk)
        } else if ext.eq_ignore_ascii_case("desktop") {
            Some(Self::Desktop)
        } else {
            None
        }
    }

    /// Store that reads and writes this kind
    pub fn store(&self) -> &'static dyn ShortcutStore {
        match self {
            Self::Lnk => &LnkStore,
            Self::Desktop => &DesktopStore,
            Self::Symlink => &SymlinkStore,
        }
    }
}

impl fmt::Display for ShortcutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lnk => "lnk",
            Self::Desktop => "desktop",
            Self::Symlink => "symlink",
        };
        write!(f, "{}", name)
    }
}

/// What a shortcut points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutTarget {
    /// Recorded target path, anchored at the shortcut's directory if relative
    pub target: PathBuf,

    /// Working directory, for kinds that record one
    pub working_dir: Option<PathBuf>,
}

impl ShortcutTarget {
    /// Target moved to `new_path`, working in its parent directory
    pub fn relocated(new_path: &Path) -> Self {
        Self {
            target: new_path.to_path_buf(),
            working_dir: new_path.parent().map(Path::to_path_buf),
        }
    }

    /// File name of the target.
    ///
    /// Both `/` and `\` count as separators so links recorded on Windows
    /// still yield a name when read elsewhere.
    pub fn basename(&self) -> Option<String> {
        let text = self.target.to_string_lossy();
        text.rsplit(['/', '\\'])
            .next()
            .filter(|name| !name.is_empty() && *name != "." && *name != "..")
            .map(str::to_string)
    }
}

/// Reads and rewrites one kind of shortcut
#[async_trait]
pub trait ShortcutStore: Send + Sync {
    /// Parse the shortcut at `path`.
    ///
    /// Fails with [`RelinkError::NotFileShortcut`] when the shortcut is
    /// valid but points at something other than a file (a bare command,
    /// a web address, a shell namespace item).
    async fn read(&self, path: &Path) -> RelinkResult<ShortcutTarget>;

    /// Point the shortcut at `path` to `target`
    async fn write(&self, path: &Path, target: &ShortcutTarget) -> RelinkResult<()>;
}

/// Resolve a recorded target against the directory holding the shortcut
pub(crate) fn anchor(shortcut: &Path, target: PathBuf) -> PathBuf {
    if looks_absolute(&target) {
        return target;
    }
    match shortcut.parent() {
        Some(dir) => dir.join(target),
        None => target,
    }
}

/// Hidden sibling a rewrite is staged in before it is renamed over `path`
pub(crate) fn staging_path(path: &Path) -> RelinkResult<PathBuf> {
    let name = path.file_name().ok_or_else(|| RelinkError::PathInvalid {
        path: path.to_path_buf(),
        reason: "shortcut has no file name".to_string(),
    })?;
    let mut staged = std::ffi::OsString::from(".");
    staged.push(name);
    staged.push(".relink-tmp");
    Ok(path.with_file_name(staged))
}

/// Absolute on this platform, or a Windows drive/UNC path
fn looks_absolute(path: &Path) -> bool {
    if path.is_absolute() {
        return true;
    }
    let text = path.to_string_lossy();
    let bytes = text.as_bytes();
    let drive = bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/');
    drive || text.starts_with("\\\\")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_extension() {
        assert_eq!(ShortcutKind::from_extension("LNK"), Some(ShortcutKind::Lnk));
        assert_eq!(
            ShortcutKind::from_extension("desktop"),
            Some(ShortcutKind::Desktop)
        );
        assert_eq!(ShortcutKind::from_extension("txt"), None);
    }

    #[test]
    fn basename_handles_both_separators() {
        let unix = ShortcutTarget {
            target: PathBuf::from("/home/me/report.docx"),
            working_dir: None,
        };
        let windows = ShortcutTarget {
            target: PathBuf::from(r"D:\Docs\report.docx"),
            working_dir: None,
        };
        assert_eq!(unix.basename().as_deref(), Some("report.docx"));
        assert_eq!(windows.basename().as_deref(), Some("report.docx"));
    }

    #[test]
    fn basename_missing_for_directory_style_targets() {
        for raw in ["/home/me/", r"D:\", ".."] {
            let target = ShortcutTarget {
                target: PathBuf::from(raw),
                working_dir: None,
            };
            assert_eq!(target.basename(), None, "{raw}");
        }
    }

    #[test]
    fn staging_path_is_a_hidden_sibling() {
        assert_eq!(
            staging_path(Path::new("/d/report.lnk")).unwrap(),
            PathBuf::from("/d/.report.lnk.relink-tmp")
        );
        assert!(staging_path(Path::new("/")).is_err());
    }

    #[test]
    fn relocated_sets_working_dir() {
        let moved = ShortcutTarget::relocated(Path::new("/v2/data/report.docx"));
        assert_eq!(moved.target, PathBuf::from("/v2/data/report.docx"));
        assert_eq!(moved.working_dir, Some(PathBuf::from("/v2/data")));
    }

    #[cfg(unix)]
    #[test]
    fn anchor_keeps_absolute_and_windows_paths() {
        let link = Path::new("/home/me/Desktop/a.lnk");
        assert_eq!(
            anchor(link, PathBuf::from("/srv/a.txt")),
            PathBuf::from("/srv/a.txt")
        );
        assert_eq!(
            anchor(link, PathBuf::from(r"E:\a.txt")),
            PathBuf::from(r"E:\a.txt")
        );
        assert_eq!(
            anchor(link, PathBuf::from("docs/a.txt")),
            PathBuf::from("/home/me/Desktop/docs/a.txt")
        );
    }
}
