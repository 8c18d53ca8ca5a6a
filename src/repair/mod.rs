//! Shortcut repair runs
//!
//! A [`RepairRun`] owns everything scoped to one invocation: the fixed
//! volume set, the locator, the lookup cache and the change log. Each
//! shortcut is handled independently; failures are recorded in its
//! [`ShortcutReport`] and never stop the run.

mod report;

pub use report::{Outcome, RepairSummary, ShortcutReport};

use crate::changelog::ChangeLog;
use crate::error::RelinkError;
use crate::locate::{LookupCache, ParallelLocator};
use crate::shortcut::{FoundShortcut, ShortcutTarget};
use crate::volumes::Volume;
use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

/// Knobs for a repair run
#[derive(Debug, Clone, Copy)]
pub struct RepairOptions {
    /// Look up replacements without rewriting anything
    pub dry_run: bool,
    /// Shortcuts handled at once
    pub concurrency: usize,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            concurrency: 8,
        }
    }
}

pub struct RepairRun {
    volumes: Vec<Volume>,
    locator: ParallelLocator,
    cache: LookupCache,
    changelog: ChangeLog,
    options: RepairOptions,
}

impl RepairRun {
    pub fn new(
        volumes: Vec<Volume>,
        locator: ParallelLocator,
        changelog: ChangeLog,
        options: RepairOptions,
    ) -> Self {
        Self {
            volumes,
            locator,
            cache: LookupCache::new(),
            changelog,
            options,
        }
    }

    pub fn cache(&self) -> &LookupCache {
        &self.cache
    }

    pub fn volumes(&self) -> &[Volume] {
        &self.volumes
    }

    /// Check one shortcut and repoint it if its target is gone
    pub async fn repair_one(&self, found: &FoundShortcut) -> ShortcutReport {
        let outcome = self.outcome(found).await;
        match &outcome {
            Outcome::Healthy => debug!("{} is healthy", found.path.display()),
            Outcome::Failed { error } => warn!("{}: {}", found.path.display(), error),
            other => info!("{}: {}", found.path.display(), other),
        }
        ShortcutReport {
            path: found.path.clone(),
            kind: found.kind,
            outcome,
        }
    }

    async fn outcome(&self, found: &FoundShortcut) -> Outcome {
        let store = found.kind.store();
        let current = match store.read(&found.path).await {
            Ok(target) => target,
            Err(RelinkError::NotFileShortcut(_)) => {
                return Outcome::Skipped {
                    reason: "not a file shortcut".to_string(),
                }
            }
            Err(e) => {
                return Outcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        // only a definite absence is repaired
        match tokio::fs::try_exists(&current.target).await {
            Ok(true) => return Outcome::Healthy,
            Ok(false) => {}
            Err(e) => {
                return Outcome::Skipped {
                    reason: format!("cannot check {}: {}", current.target.display(), e),
                }
            }
        }

        let Some(basename) = current.basename() else {
            return Outcome::Skipped {
                reason: format!("target {} has no file name", current.target.display()),
            };
        };

        let located = match self
            .cache
            .resolve(&basename, &self.volumes, &self.locator)
            .await
        {
            Ok(located) => located,
            Err(e) => {
                return Outcome::Skipped {
                    reason: e.to_string(),
                }
            }
        };

        let Some(new_path) = located else {
            return Outcome::Unresolved {
                target: current.target,
            };
        };

        if self.options.dry_run {
            return Outcome::WouldRepair {
                from: current.target,
                to: new_path,
            };
        }

        match store
            .write(&found.path, &ShortcutTarget::relocated(&new_path))
            .await
        {
            Ok(()) => Outcome::Repaired {
                from: current.target,
                to: new_path,
            },
            Err(e) => Outcome::Failed {
                error: e.to_string(),
            },
        }
    }

    /// Repair every shortcut, calling `on_report` as each one finishes.
    ///
    /// Completion order is not submission order.
    pub async fn run<F>(&self, shortcuts: Vec<FoundShortcut>, mut on_report: F) -> RepairSummary
    where
        F: FnMut(&ShortcutReport),
    {
        let mut summary = RepairSummary::default();
        let mut reports = stream::iter(shortcuts.iter())
            .map(|found| self.repair_one(found))
            .buffer_unordered(self.options.concurrency.max(1));

        while let Some(report) = reports.next().await {
            self.changelog.record(&report).await;
            summary.add(&report);
            on_report(&report);
        }

        summary.lookups = self.cache.len();
        summary
    }
}
