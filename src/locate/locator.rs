//! Concurrent multi-volume lookup

use super::scanner::{ScanCancel, VolumeScanner};
use crate::volumes::Volume;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Races one scan per volume and returns the first match.
///
/// Losing scans are abandoned: their results are never consulted and
/// their shared [`ScanCancel`] flag is raised so they stop walking at the
/// next directory entry. When several volumes hold the same basename,
/// whichever scan finishes first wins.
#[derive(Clone)]
pub struct ParallelLocator {
    scanner: Arc<dyn VolumeScanner>,
    timeout: Option<Duration>,
}

impl ParallelLocator {
    pub fn new(scanner: Arc<dyn VolumeScanner>) -> Self {
        Self {
            scanner,
            timeout: None,
        }
    }

    /// Give up on a lookup after `timeout`, reporting no match
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Find `basename` on any of `volumes`.
    ///
    /// Never fails: unavailable volumes, scanner errors, and panics inside
    /// a scan all count as "not on that volume".
    pub async fn locate(&self, basename: &str, volumes: &[Volume]) -> Option<PathBuf> {
        if volumes.is_empty() {
            return None;
        }

        let cancel = ScanCancel::new();
        let _guard = cancel.guard();
        let race = self.race(basename, volumes, &cancel);

        match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, race).await {
                Ok(found) => found,
                Err(_) => {
                    warn!(
                        "Lookup of {} timed out after {}s",
                        basename,
                        limit.as_secs_f64()
                    );
                    None
                }
            },
            None => race.await,
        }
    }

    async fn race(&self, basename: &str, volumes: &[Volume], cancel: &ScanCancel) -> Option<PathBuf> {
        let mut scans = JoinSet::new();

        for volume in volumes {
            let scanner = Arc::clone(&self.scanner);
            let volume = volume.clone();
            let basename = basename.to_string();
            let cancel = cancel.clone();
            scans.spawn_blocking(move || {
                let result = scanner.scan(&volume, &basename, &cancel);
                (volume, result)
            });
        }

        while let Some(joined) = scans.join_next().await {
            match joined {
                Ok((volume, Ok(Some(path)))) => {
                    debug!("Found {} on {}: {}", basename, volume, path.display());
                    return Some(path);
                }
                Ok((volume, Ok(None))) => {
                    debug!("{} not on {}", basename, volume);
                }
                Ok((volume, Err(e))) => {
                    warn!("Skipping {} while looking for {}: {}", volume, basename, e);
                }
                Err(e) => {
                    warn!("Volume scan for {} aborted: {}", basename, e);
                }
            }
        }

        None
    }
}
