//! Output functions for consistent CLI formatting

use super::context::UiContext;
use crate::repair::{Outcome, RepairSummary, ShortcutReport};
use console::{style, Style};

/// Display intro banner
pub fn intro(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        cliclack::intro(style(title).blue().bold()).ok();
    } else {
        println!("{}", style(title).blue().bold());
        println!();
    }
}

/// Display success outro
pub fn outro_success(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::outro(style(message).green().bold()).ok();
    } else {
        println!();
        println!("{} {}", style("[OK]").green(), message);
    }
}

/// Display warning outro
pub fn outro_warn(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::outro(style(message).yellow().bold()).ok();
    } else {
        println!();
        println!("{} {}", style("[WARN]").yellow(), message);
    }
}

pub fn step_ok(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::success(message).ok();
    } else {
        println!("  {} {}", style("[OK]").green(), message);
    }
}

pub fn step_warn(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::warning(message).ok();
    } else {
        println!("  {} {}", style("[WARN]").yellow(), message);
    }
}

pub fn step_error(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::error(message).ok();
    } else {
        println!("  {} {}", style("[FAIL]").red(), message);
    }
}

pub fn step_info(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::info(message).ok();
    } else {
        println!("  {} {}", style("[INFO]").cyan(), message);
    }
}

/// Display a remark/hint
pub fn remark(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::remark(message).ok();
    } else {
        println!("  {}", style(message).dim());
    }
}

/// Print styled key-value pair
pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {}: {}", key, value);
    }
}

/// Print styled key-value with status color
pub fn key_value_status(ctx: &UiContext, key: &str, value: &str, ok: bool) {
    let value_style = if ok {
        Style::new().green()
    } else {
        Style::new().yellow()
    };

    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value_style.apply_to(value));
    } else {
        let prefix = if ok { "[OK]" } else { "[WARN]" };
        println!("  {} {}: {}", prefix, key, value);
    }
}

/// One line per shortcut that needed attention; healthy ones stay quiet
pub fn shortcut_report(ctx: &UiContext, report: &ShortcutReport) {
    let shortcut = report.path.display();
    match &report.outcome {
        Outcome::Healthy => {}
        Outcome::Repaired { from, to } => step_ok(
            ctx,
            &format!("{}: {} -> {}", shortcut, from.display(), to.display()),
        ),
        Outcome::WouldRepair { from, to } => step_info(
            ctx,
            &format!(
                "{}: would change {} -> {}",
                shortcut,
                from.display(),
                to.display()
            ),
        ),
        Outcome::Unresolved { target } => step_warn(
            ctx,
            &format!("{}: no replacement for {}", shortcut, target.display()),
        ),
        Outcome::Skipped { reason } => remark(ctx, &format!("{}: skipped ({})", shortcut, reason)),
        Outcome::Failed { error } => step_error(ctx, &format!("{}: {}", shortcut, error)),
    }
}

/// Totals printed at the end of a repair run
pub fn summary(ctx: &UiContext, summary: &RepairSummary, dry_run: bool) {
    let repaired_label = if dry_run { "Would repair" } else { "Repaired" };
    println!();
    key_value(ctx, "Scanned", &summary.scanned.to_string());
    key_value(ctx, "Healthy", &summary.healthy.to_string());
    key_value_status(ctx, repaired_label, &summary.repaired.to_string(), true);
    key_value_status(
        ctx,
        "Unresolved",
        &summary.unresolved.to_string(),
        summary.unresolved == 0,
    );
    key_value(ctx, "Skipped", &summary.skipped.to_string());
    key_value_status(ctx, "Failed", &summary.failed.to_string(), summary.failed == 0);
    key_value(ctx, "Lookups", &summary.lookups.to_string());
}
