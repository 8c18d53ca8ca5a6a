//! Fix command - repair broken shortcuts

use crate::changelog::ChangeLog;
use crate::cli::args::FixArgs;
use crate::config::Config;
use crate::error::{RelinkError, RelinkResult};
use crate::locate::{ParallelLocator, WalkScanner};
use crate::repair::{RepairOptions, RepairRun};
use crate::shortcut::{FoundShortcut, ShortcutWalker};
use crate::ui::{self, RepairProgress, TaskSpinner, UiContext};
use crate::volumes::{self, Volume, VolumeSelection, VolumeSource};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub async fn execute(args: FixArgs, config: &Config) -> RelinkResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);
    let dry_run = args.dry_run || config.repair.dry_run;

    ui::intro(&ctx, if dry_run { "relink (dry run)" } else { "relink" });

    let root = repair_root(&args, config)?;
    let mut selection = volumes::plan(&config.volumes, &args.volumes.volumes, &args.volumes.exclude);
    if config.volumes.prompt && selection.source == VolumeSource::Discovered {
        prompt_exclusions(&ctx, &mut selection).await?;
    }
    if selection.searched.is_empty() {
        return Err(RelinkError::NoVolumes);
    }

    let names: Vec<String> = selection.searched.iter().map(Volume::to_string).collect();
    ui::step_info(
        &ctx,
        &format!("Searching {} volume(s): {}", names.len(), names.join(", ")),
    );

    let shortcuts = find_shortcuts(&ctx, &root, config, args.symlinks).await?;
    if shortcuts.is_empty() {
        ui::outro_success(&ctx, "Nothing to repair");
        return Ok(());
    }

    if !dry_run
        && !ui::confirm(
            &ctx,
            &format!("Check {} shortcut(s) and rewrite broken ones?", shortcuts.len()),
            true,
        )
        .await?
    {
        ui::outro_warn(&ctx, "Cancelled");
        return Ok(());
    }

    let timeout_secs = args.timeout.unwrap_or(config.locate.timeout_secs);
    let timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));
    let scanner = WalkScanner::new().follow_links(config.locate.follow_links);
    let locator = ParallelLocator::new(Arc::new(scanner)).with_timeout(timeout);

    let changelog = if dry_run {
        ChangeLog::disabled()
    } else {
        ChangeLog::new(config)
    };
    debug!("Change log run {} at {}", changelog.run_id(), changelog.path().display());

    let options = RepairOptions {
        dry_run,
        concurrency: args
            .jobs
            .map(usize::from)
            .unwrap_or(config.repair.concurrency),
    };
    let run = RepairRun::new(selection.searched, locator, changelog, options);

    let progress = RepairProgress::new(&ctx, shortcuts.len());
    let summary = run
        .run(shortcuts, |report| {
            let name = report
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            progress.advance(&name);
            progress.println(|| ui::shortcut_report(&ctx, report));
        })
        .await;
    progress.finish();

    info!(
        "Repair finished: {} scanned, {} repaired, {} unresolved",
        summary.scanned, summary.repaired, summary.unresolved
    );
    ui::summary(&ctx, &summary, dry_run);

    if summary.has_problems() {
        ui::outro_warn(&ctx, "Some shortcuts are still broken");
    } else if summary.repaired == 0 {
        ui::outro_success(&ctx, "All shortcuts are healthy");
    } else if dry_run {
        ui::outro_success(&ctx, "Run without --dry-run to apply");
    } else {
        ui::outro_success(&ctx, "Shortcuts repaired");
    }
    Ok(())
}

fn repair_root(args: &FixArgs, config: &Config) -> RelinkResult<PathBuf> {
    let root = args
        .root
        .clone()
        .or_else(|| config.repair.root.clone())
        .or_else(dirs::home_dir)
        .ok_or_else(|| RelinkError::User("Cannot determine the home directory".to_string()))?;

    if !root.is_dir() {
        return Err(RelinkError::PathNotFound(root));
    }
    Ok(root)
}

/// Offer the discovered volumes for exclusion
async fn prompt_exclusions(ctx: &UiContext, selection: &mut VolumeSelection) -> RelinkResult<()> {
    let options: Vec<(Volume, String)> = selection
        .searched
        .iter()
        .map(|v| (v.clone(), v.to_string()))
        .collect();
    let chosen = ui::multiselect(ctx, "Exclude any of these volumes?", &options, vec![]).await?;
    selection.exclude(&chosen);
    Ok(())
}

async fn find_shortcuts(
    ctx: &UiContext,
    root: &std::path::Path,
    config: &Config,
    symlinks: bool,
) -> RelinkResult<Vec<FoundShortcut>> {
    let walker = ShortcutWalker::new(root)
        .extensions(&config.repair.extensions)
        .symlinks(symlinks || config.repair.symlinks);

    let mut spinner = TaskSpinner::new(ctx);
    spinner.start(&format!("Finding shortcuts under {}...", root.display()));

    let shortcuts = tokio::task::spawn_blocking(move || walker.walk().collect::<Vec<_>>())
        .await
        .map_err(|e| RelinkError::Internal(format!("Shortcut search failed: {}", e)))?;

    if shortcuts.is_empty() {
        spinner.stop_warn("No shortcuts found");
    } else {
        spinner.stop(&format!("Found {} shortcut(s)", shortcuts.len()));
    }
    Ok(shortcuts)
}
