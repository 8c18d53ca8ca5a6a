//! Error types for relink
//!
//! All modules use `RelinkResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for relink operations
pub type RelinkResult<T> = Result<T, RelinkError>;

/// All errors that can occur in relink
#[derive(Error, Debug)]
pub enum RelinkError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Lookup errors
    #[error("Invalid basename '{0}': must be a plain file name")]
    InvalidBasename(String),

    #[error("No volumes to search")]
    NoVolumes,

    #[error("Volume unavailable: {path}")]
    VolumeUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Shortcut errors
    #[error("Failed to parse shortcut {path}: {reason}")]
    ShortcutParse { path: PathBuf, reason: String },

    #[error("Failed to write shortcut {path}: {reason}")]
    ShortcutWrite { path: PathBuf, reason: String },

    #[error("{0} does not point at a file")]
    NotFileShortcut(PathBuf),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Invalid path: {path}: {reason}")]
    PathInvalid { path: PathBuf, reason: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl RelinkError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a shortcut parse error
    pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ShortcutParse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a shortcut write error
    pub fn write(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ShortcutWrite {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NoVolumes => {
                Some("Pass --volume <PATH>, or adjust [volumes] include/exclude in the config")
            }
            Self::ConfigInvalid { .. } => Some("Run: relink config init --force"),
            Self::InvalidBasename(_) => Some("Pass a file name without directory components"),
            _ => None,
        }
    }
}
