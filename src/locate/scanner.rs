//! Single-volume file search

use crate::error::{RelinkError, RelinkResult};
use crate::volumes::Volume;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;
use walkdir::WalkDir;

/// Cooperative cancellation flag shared by the scans of one lookup.
///
/// Scanners poll it between directory entries; once set, they stop
/// walking and report no match.
#[derive(Debug, Clone, Default)]
pub struct ScanCancel(Arc<AtomicBool>);

impl ScanCancel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Guard that cancels the flag when dropped
    pub fn guard(&self) -> CancelGuard {
        CancelGuard(self.clone())
    }
}

/// Cancels the owning lookup's scans on drop
#[derive(Debug)]
pub struct CancelGuard(ScanCancel);

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Searches one volume for a file with a given basename.
///
/// Implementations perform blocking I/O and are run on the blocking
/// pool by [`ParallelLocator`](super::ParallelLocator). An `Err` means the
/// whole volume could not be searched; unreadable subdirectories must be
/// skipped rather than reported.
pub trait VolumeScanner: Send + Sync {
    fn scan(
        &self,
        volume: &Volume,
        basename: &str,
        cancel: &ScanCancel,
    ) -> RelinkResult<Option<PathBuf>>;
}

/// Directory-walking scanner backed by `walkdir`.
///
/// Each directory under the volume root is probed for `basename`; the
/// first directory containing a non-directory entry of that name wins.
/// Walk order is whatever the OS returns, so with several copies on one
/// volume the winner is not guaranteed to be stable across runs.
#[derive(Debug, Clone, Default)]
pub struct WalkScanner {
    follow_links: bool,
}

impl WalkScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow symbolic links to directories while walking
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }
}

impl VolumeScanner for WalkScanner {
    fn scan(
        &self,
        volume: &Volume,
        basename: &str,
        cancel: &ScanCancel,
    ) -> RelinkResult<Option<PathBuf>> {
        let root = volume.root();
        let meta = fs::metadata(root).map_err(|e| RelinkError::VolumeUnavailable {
            path: root.to_path_buf(),
            source: e,
        })?;
        if !meta.is_dir() {
            return Err(RelinkError::VolumeUnavailable {
                path: root.to_path_buf(),
                source: std::io::Error::other("not a directory"),
            });
        }

        let walker = WalkDir::new(root).follow_links(self.follow_links);
        for entry in walker {
            if cancel.is_cancelled() {
                debug!("Scan of {} abandoned", volume);
                return Ok(None);
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry under {}: {}", volume, e);
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            let candidate = entry.path().join(basename);
            match fs::metadata(&candidate) {
                Ok(meta) if !meta.is_dir() => return Ok(Some(candidate)),
                _ => {}
            }
        }

        Ok(None)
    }
}
