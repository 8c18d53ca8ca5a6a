//! Change log of shortcut repairs
//!
//! Writes JSON lines to `~/.local/state/relink/changes.log` unless
//! `general.change_log_path` points elsewhere. Every line carries the run
//! id so entries from one invocation can be grouped.

use crate::config::{schema::Config, ConfigManager};
use crate::repair::{Outcome, ShortcutReport};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;
use uuid::Uuid;

/// Append-only JSON lines log of what a run changed
#[derive(Debug)]
pub struct ChangeLog {
    enabled: bool,
    path: PathBuf,
    run_id: Uuid,
}

impl ChangeLog {
    pub fn new(config: &Config) -> Self {
        let path = config
            .general
            .change_log_path
            .clone()
            .unwrap_or_else(ConfigManager::change_log_path);
        Self::at(path, config.general.change_log)
    }

    /// Log to an explicit file
    pub fn at(path: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            enabled,
            path: path.into(),
            run_id: Uuid::new_v4(),
        }
    }

    /// A log that drops everything
    pub fn disabled() -> Self {
        Self::at(PathBuf::new(), false)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Append an event as a JSON line.
    ///
    /// I/O failures are logged and swallowed; a broken log never stops a
    /// repair.
    pub async fn log(&self, event: &str, data: &serde_json::Value) {
        if !self.enabled {
            return;
        }

        let entry = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "run": self.run_id,
            "event": event,
            "data": data,
        });

        let mut line = match serde_json::to_string(&entry) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize change log event: {}", e);
                return;
            }
        };
        line.push('\n');

        if let Err(e) = self.append(&line).await {
            warn!("Failed to write change log {}: {}", self.path.display(), e);
        }
    }

    /// Log the outcome of one shortcut; healthy shortcuts are not logged
    pub async fn record(&self, report: &ShortcutReport) {
        let shortcut = report.path.display().to_string();
        let (event, data) = match &report.outcome {
            Outcome::Healthy => return,
            Outcome::Repaired { from, to } => (
                "shortcut.repaired",
                serde_json::json!({
                    "shortcut": shortcut,
                    "kind": report.kind,
                    "from": from,
                    "to": to,
                    "message": format!(
                        "Changed {} from {} to {}",
                        shortcut,
                        from.display(),
                        to.display()
                    ),
                }),
            ),
            Outcome::WouldRepair { .. } => return,
            Outcome::Unresolved { target } => (
                "shortcut.unresolved",
                serde_json::json!({
                    "shortcut": shortcut,
                    "kind": report.kind,
                    "target": target,
                    "message": format!("No replacement found for {}", target.display()),
                }),
            ),
            Outcome::Skipped { reason } => (
                "shortcut.skipped",
                serde_json::json!({
                    "shortcut": shortcut,
                    "kind": report.kind,
                    "message": reason,
                }),
            ),
            Outcome::Failed { error } => (
                "shortcut.error",
                serde_json::json!({
                    "shortcut": shortcut,
                    "kind": report.kind,
                    "message": error,
                }),
            ),
        };
        self.log(event, &data).await;
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
