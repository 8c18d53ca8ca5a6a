//! Configuration schema for relink
//!
//! Configuration is stored at `~/.config/relink/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Which volumes are searched for moved targets
    pub volumes: VolumesConfig,

    /// File lookup settings
    pub locate: LocateConfig,

    /// Repair run settings
    pub repair: RepairConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,

    /// Record every repair and error in the change log
    pub change_log: bool,

    /// Override the change log location
    pub change_log_path: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
            change_log: true,
            change_log_path: None,
        }
    }
}

/// Volume selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumesConfig {
    /// Explicit volume roots; replaces discovery when non-empty
    pub include: Vec<PathBuf>,

    /// Volume roots never searched
    pub exclude: Vec<PathBuf>,

    /// Ask which discovered volumes to exclude before a repair
    pub prompt: bool,
}

impl Default for VolumesConfig {
    fn default() -> Self {
        Self {
            include: vec![],
            exclude: vec![default_system_volume()],
            prompt: false,
        }
    }
}

#[cfg(windows)]
fn default_system_volume() -> PathBuf {
    PathBuf::from(r"C:\")
}

#[cfg(not(windows))]
fn default_system_volume() -> PathBuf {
    PathBuf::from("/")
}

/// Lookup settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocateConfig {
    /// Give up on a lookup after N seconds (0 = wait for every volume)
    pub timeout_secs: u64,

    /// Follow symbolic links while walking volumes
    pub follow_links: bool,
}

/// Repair run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    /// Directory scanned for shortcuts (defaults to the home directory)
    pub root: Option<PathBuf>,

    /// Shortcuts repaired concurrently
    pub concurrency: usize,

    /// Shortcut file extensions to consider
    pub extensions: Vec<String>,

    /// Also repair dangling symbolic links
    pub symlinks: bool,

    /// Report what would change without writing
    pub dry_run: bool,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            root: None,
            concurrency: 8,
            extensions: vec!["lnk".to_string(), "desktop".to_string()],
            symlinks: false,
            dry_run: false,
        }
    }
}
