//! Recursive discovery of shortcut files

use super::ShortcutKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// A shortcut file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundShortcut {
    pub path: PathBuf,
    pub kind: ShortcutKind,
}

/// Lazily walks a directory tree yielding shortcut files.
///
/// Symbolic links are never followed; they are yielded as
/// [`ShortcutKind::Symlink`] when symlink repair is enabled. Unreadable
/// directories are skipped.
#[derive(Debug, Clone)]
pub struct ShortcutWalker {
    root: PathBuf,
    extensions: Vec<String>,
    symlinks: bool,
}

impl ShortcutWalker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: vec!["lnk".to_string(), "desktop".to_string()],
            symlinks: false,
        }
    }

    /// Only consider these extensions (without the dot)
    pub fn extensions(mut self, extensions: &[String]) -> Self {
        self.extensions = extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    pub fn symlinks(mut self, enabled: bool) -> Self {
        self.symlinks = enabled;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn walk(&self) -> impl Iterator<Item = FoundShortcut> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter_map(move |entry| self.classify(&entry))
    }

    fn classify(&self, entry: &DirEntry) -> Option<FoundShortcut> {
        let file_type = entry.file_type();
        if file_type.is_symlink() {
            return self.symlinks.then(|| FoundShortcut {
                path: entry.path().to_path_buf(),
                kind: ShortcutKind::Symlink,
            });
        }
        if !file_type.is_file() {
            return None;
        }

        let ext = entry.path().extension()?.to_str()?.to_ascii_lowercase();
        if !self.extensions.contains(&ext) {
            return None;
        }
        ShortcutKind::from_extension(&ext).map(|kind| FoundShortcut {
            path: entry.path().to_path_buf(),
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn layout() -> TempDir {
        let temp = TempDir::new().unwrap();
        let desk = temp.path().join("Desktop");
        fs::create_dir_all(desk.join("nested")).unwrap();
        fs::write(desk.join("a.lnk"), b"").unwrap();
        fs::write(desk.join("nested").join("B.LNK"), b"").unwrap();
        fs::write(desk.join("app.desktop"), b"").unwrap();
        fs::write(desk.join("notes.txt"), b"").unwrap();
        temp
    }

    fn sorted(walker: &ShortcutWalker) -> Vec<FoundShortcut> {
        let mut found: Vec<_> = walker.walk().collect();
        found.sort_by(|a, b| a.path.cmp(&b.path));
        found
    }

    #[test]
    fn finds_lnk_and_desktop_files() {
        let temp = layout();
        let found = sorted(&ShortcutWalker::new(temp.path()));

        let kinds: Vec<ShortcutKind> = found.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![ShortcutKind::Lnk, ShortcutKind::Desktop, ShortcutKind::Lnk]
        );
        assert!(found.iter().all(|f| !f.path.ends_with("notes.txt")));
    }

    #[test]
    fn extension_filter_applies() {
        let temp = layout();
        let walker = ShortcutWalker::new(temp.path()).extensions(&[".desktop".to_string()]);
        let found = sorted(&walker);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, ShortcutKind::Desktop);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_only_when_enabled() {
        let temp = layout();
        std::os::unix::fs::symlink("/nowhere/x.pdf", temp.path().join("x.pdf")).unwrap();

        let without = sorted(&ShortcutWalker::new(temp.path()));
        assert!(without.iter().all(|f| f.kind != ShortcutKind::Symlink));

        let with = sorted(&ShortcutWalker::new(temp.path()).symlinks(true));
        let links: Vec<_> = with
            .iter()
            .filter(|f| f.kind == ShortcutKind::Symlink)
            .collect();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].path, temp.path().join("x.pdf"));
    }

    #[test]
    fn missing_root_yields_nothing() {
        let temp = TempDir::new().unwrap();
        let walker = ShortcutWalker::new(temp.path().join("absent"));
        assert_eq!(walker.walk().count(), 0);
    }
}
