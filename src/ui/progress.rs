//! Progress indicators with CI fallback

use super::context::UiContext;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// A task spinner with CI fallback
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            println!("{} {}", style("...").dim(), message);
        }
    }

    /// Stop with success message
    pub fn stop(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        } else if self.interactive {
            println!("{} {}", style("✓").green(), message);
        } else {
            println!("{} {}", style("[OK]").green(), message);
        }
    }

    /// Stop with warning message
    pub fn stop_warn(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        } else if self.interactive {
            println!("{} {}", style("!").yellow(), message);
        } else {
            println!("{} {}", style("[WARN]").yellow(), message);
        }
    }
}

/// Progress bar over the shortcuts of a repair run.
///
/// Interactive terminals get an indicatif bar; output printed through
/// [`RepairProgress::println`] is drawn above it. In CI the bar is
/// omitted and lines go straight to stdout.
pub struct RepairProgress {
    bar: Option<ProgressBar>,
}

impl RepairProgress {
    pub fn new(ctx: &UiContext, total: usize) -> Self {
        let bar = ctx.use_fancy_output().then(|| {
            let bar = ProgressBar::new(total as u64);
            if let Ok(bar_style) = ProgressStyle::default_bar().template(
                "  {spinner:.blue} Checking  {bar:24.blue/dim} {pos}/{len} {msg:.dim}  {elapsed:.dim}",
            ) {
                bar.set_style(
                    bar_style
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                        .progress_chars("━╸─"),
                );
            }
            bar.enable_steady_tick(Duration::from_millis(120));
            bar
        });
        Self { bar }
    }

    /// Advance by one shortcut, showing its file name
    pub fn advance(&self, name: &str) {
        if let Some(ref bar) = self.bar {
            bar.set_message(truncate(name, 40));
            bar.inc(1);
        }
    }

    /// Run `print` without tearing the bar
    pub fn println<F: FnOnce()>(&self, print: F) {
        match self.bar {
            Some(ref bar) => bar.suspend(print),
            None => print(),
        }
    }

    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}
