//! Run-scoped memo of basename lookups

use super::locator::ParallelLocator;
use crate::error::{RelinkError, RelinkResult};
use crate::volumes::Volume;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::OnceCell;
use tracing::debug;

/// Outcome of looking up one basename
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    Found(PathBuf),
    NotFound,
}

impl LookupResult {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Found(path) => Some(path),
            Self::NotFound => None,
        }
    }

    pub fn into_path(self) -> Option<PathBuf> {
        match self {
            Self::Found(path) => Some(path),
            Self::NotFound => None,
        }
    }
}

impl From<Option<PathBuf>> for LookupResult {
    fn from(found: Option<PathBuf>) -> Self {
        found.map_or(Self::NotFound, Self::Found)
    }
}

/// Memo of lookups for the lifetime of one repair run.
///
/// Entries are final once computed: a cached `Found` is returned even if
/// the file has since moved, and a cached `NotFound` is never retried.
/// Concurrent callers asking for the same uncached basename share one
/// scan. Entries are never evicted.
#[derive(Debug, Default)]
pub struct LookupCache {
    entries: Mutex<HashMap<String, Arc<OnceCell<LookupResult>>>>,
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `basename`, consulting the memo before scanning `volumes`.
    pub async fn resolve(
        &self,
        basename: &str,
        volumes: &[Volume],
        locator: &ParallelLocator,
    ) -> RelinkResult<Option<PathBuf>> {
        validate_basename(basename)?;

        let cell = Arc::clone(self.lock().entry(basename.to_string()).or_default());
        let result = cell
            .get_or_init(|| async {
                debug!("Cache miss for {}, scanning {} volume(s)", basename, volumes.len());
                LookupResult::from(locator.locate(basename, volumes).await)
            })
            .await;

        Ok(result.clone().into_path())
    }

    /// Look at a completed entry without triggering a scan
    pub fn get(&self, basename: &str) -> Option<LookupResult> {
        self.lock()
            .get(basename)
            .and_then(|cell| cell.get())
            .cloned()
    }

    /// Number of completed entries
    pub fn len(&self) -> usize {
        self.lock()
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<OnceCell<LookupResult>>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Reject keys that are not a single path component
pub fn validate_basename(basename: &str) -> RelinkResult<()> {
    if basename.is_empty()
        || basename == "."
        || basename == ".."
        || basename.contains('\0')
        || basename.chars().any(std::path::is_separator)
    {
        return Err(RelinkError::InvalidBasename(basename.to_string()));
    }
    Ok(())
}
