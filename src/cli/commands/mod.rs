//! CLI command implementations

pub mod completions;
pub mod config;
pub mod fix;
pub mod locate;
pub mod volumes;

pub use completions::execute as completions;
pub use config::execute as config;
pub use fix::execute as fix;
pub use locate::execute as locate;
pub use volumes::execute as volumes;
