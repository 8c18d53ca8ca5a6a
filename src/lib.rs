//! relink - repair shortcuts whose targets have moved
//!
//! Scans a directory tree for shortcut files, and when a shortcut's target
//! no longer exists, searches every mounted volume in parallel for a file
//! with the same name and points the shortcut at it.

pub mod changelog;
pub mod cli;
pub mod config;
pub mod error;
pub mod locate;
pub mod repair;
pub mod shortcut;
pub mod ui;
pub mod volumes;

pub use error::{RelinkError, RelinkResult};
