//! Per-shortcut outcomes and run totals

use crate::shortcut::ShortcutKind;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// What happened to one shortcut
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Target still exists
    Healthy,
    /// Shortcut rewritten to the located file
    Repaired { from: PathBuf, to: PathBuf },
    /// Dry run: would have been rewritten
    WouldRepair { from: PathBuf, to: PathBuf },
    /// Target missing and no volume holds a file with its name
    Unresolved { target: PathBuf },
    /// Left alone without looking for a replacement
    Skipped { reason: String },
    /// Reading or rewriting the shortcut failed
    Failed { error: String },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Repaired { from, to } => {
                write!(f, "repaired {} -> {}", from.display(), to.display())
            }
            Self::WouldRepair { from, to } => {
                write!(f, "would repair {} -> {}", from.display(), to.display())
            }
            Self::Unresolved { target } => write!(f, "unresolved {}", target.display()),
            Self::Skipped { reason } => write!(f, "skipped: {}", reason),
            Self::Failed { error } => write!(f, "failed: {}", error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortcutReport {
    pub path: PathBuf,
    pub kind: ShortcutKind,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Totals for a repair run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RepairSummary {
    pub scanned: usize,
    pub healthy: usize,
    pub repaired: usize,
    pub unresolved: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Distinct basenames looked up
    pub lookups: usize,
}

impl RepairSummary {
    pub fn add(&mut self, report: &ShortcutReport) {
        self.scanned += 1;
        match report.outcome {
            Outcome::Healthy => self.healthy += 1,
            Outcome::Repaired { .. } | Outcome::WouldRepair { .. } => self.repaired += 1,
            Outcome::Unresolved { .. } => self.unresolved += 1,
            Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Any shortcut still broken after the run
    pub fn has_problems(&self) -> bool {
        self.unresolved > 0 || self.failed > 0
    }
}
