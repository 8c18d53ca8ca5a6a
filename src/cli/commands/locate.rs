//! Locate command - run a single lookup across the volumes

use crate::cli::args::LocateArgs;
use crate::config::Config;
use crate::error::{RelinkError, RelinkResult};
use crate::locate::{LookupCache, ParallelLocator, WalkScanner};
use crate::volumes;
use console::style;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Prints the located path, or `not found`; absence is not an error
pub async fn execute(args: LocateArgs, config: &Config) -> RelinkResult<()> {
    let selection = volumes::plan(&config.volumes, &args.volumes.volumes, &args.volumes.exclude);
    if selection.searched.is_empty() {
        return Err(RelinkError::NoVolumes);
    }
    debug!(
        "Searching {} volume(s) from {}",
        selection.searched.len(),
        selection.source
    );

    let timeout_secs = args.timeout.unwrap_or(config.locate.timeout_secs);
    let scanner = WalkScanner::new().follow_links(config.locate.follow_links);
    let locator = ParallelLocator::new(Arc::new(scanner))
        .with_timeout((timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)));

    let cache = LookupCache::new();
    match cache
        .resolve(&args.basename, &selection.searched, &locator)
        .await?
    {
        Some(path) => println!("{}", path.display()),
        None => println!("{}", style("not found").yellow()),
    }
    Ok(())
}
