//! Symbolic links used as shortcuts

use super::{anchor, staging_path, ShortcutStore, ShortcutTarget};
use crate::error::{RelinkError, RelinkResult};
use async_trait::async_trait;
use std::path::Path;
use tokio::fs;

/// Symbolic links; they record no working directory
#[derive(Debug, Clone, Copy, Default)]
pub struct SymlinkStore;

#[async_trait]
impl ShortcutStore for SymlinkStore {
    async fn read(&self, path: &Path) -> RelinkResult<ShortcutTarget> {
        let target = fs::read_link(path)
            .await
            .map_err(|e| RelinkError::parse(path, e.to_string()))?;

        Ok(ShortcutTarget {
            target: anchor(path, target),
            working_dir: None,
        })
    }

    /// Replace the link by renaming a freshly created one over it
    async fn write(&self, path: &Path, target: &ShortcutTarget) -> RelinkResult<()> {
        let staging = staging_path(path)?;
        let _ = fs::remove_file(&staging).await;

        create_link(&target.target, &staging)
            .await
            .map_err(|e| RelinkError::write(path, e.to_string()))?;

        if let Err(e) = fs::rename(&staging, path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(RelinkError::write(path, e.to_string()));
        }
        Ok(())
    }
}

#[cfg(unix)]
async fn create_link(target: &Path, link: &Path) -> std::io::Result<()> {
    fs::symlink(target, link).await
}

#[cfg(windows)]
async fn create_link(target: &Path, link: &Path) -> std::io::Result<()> {
    if target.is_dir() {
        fs::symlink_dir(target, link).await
    } else {
        fs::symlink_file(target, link).await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn relative_target_is_anchored() {
        let temp = TempDir::new().unwrap();
        let link = temp.path().join("link.txt");
        std::os::unix::fs::symlink("gone/file.txt", &link).unwrap();

        let read = SymlinkStore.read(&link).await.unwrap();
        assert_eq!(read.target, temp.path().join("gone/file.txt"));
        assert_eq!(read.working_dir, None);
    }

    #[tokio::test]
    async fn write_replaces_dangling_link() {
        let temp = TempDir::new().unwrap();
        let real = temp.path().join("moved.txt");
        std::fs::write(&real, b"x").unwrap();
        let link = temp.path().join("link.txt");
        std::os::unix::fs::symlink(temp.path().join("old.txt"), &link).unwrap();

        SymlinkStore
            .write(&link, &ShortcutTarget::relocated(&real))
            .await
            .unwrap();

        assert_eq!(std::fs::read_link(&link).unwrap(), real);
        assert_eq!(std::fs::read(&link).unwrap(), b"x");
        assert!(!temp.path().join(".link.txt.relink-tmp").exists());
    }

    #[tokio::test]
    async fn regular_file_is_a_parse_error() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain.txt");
        std::fs::write(&file, b"x").unwrap();

        let err = SymlinkStore.read(&file).await.unwrap_err();
        assert!(matches!(err, RelinkError::ShortcutParse { .. }));
    }
}
