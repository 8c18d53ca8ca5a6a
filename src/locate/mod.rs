//! Cached, parallel file lookup across volumes
//!
//! Given a basename and a set of volume roots, find a file with that name
//! on any volume:
//!
//! - [`VolumeScanner`] walks a single volume ([`WalkScanner`] by default)
//! - [`ParallelLocator`] races one scan per volume, first hit wins
//! - [`LookupCache`] memoizes results per basename for one repair run
//!
//! "Not found" is an ordinary result at every layer. Only a malformed
//! basename is an error, and it is rejected before any scan starts.

mod cache;
mod locator;
mod scanner;

pub use cache::{validate_basename, LookupCache, LookupResult};
pub use locator::ParallelLocator;
pub use scanner::{CancelGuard, ScanCancel, VolumeScanner, WalkScanner};
