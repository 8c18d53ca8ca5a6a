//! Terminal UI with automatic fallback to plain output
//!
//! Uses `cliclack` for prompts and log lines and `indicatif` for the repair
//! progress bar. When stdout is not a terminal, or a CI environment is
//! detected, everything degrades to plain prefixed lines.
//!
//! # Example
//!
//! ```rust,ignore
//! use relink::ui::{self, UiContext, TaskSpinner};
//!
//! let ctx = UiContext::detect().with_auto_yes(args.yes);
//!
//! ui::intro(&ctx, "relink");
//!
//! let mut spinner = TaskSpinner::new(&ctx);
//! spinner.start("Finding shortcuts...");
//! spinner.stop("Found 12 shortcuts");
//!
//! if ui::confirm(&ctx, "Rewrite broken shortcuts?", true).await? {
//!     // ...
//! }
//! ```

mod context;
mod output;
mod progress;
mod prompts;

pub use context::UiContext;
pub use output::{
    intro, key_value, key_value_status, outro_success, outro_warn, remark, shortcut_report,
    step_error, step_info, step_ok, step_warn, summary,
};
pub use progress::{RepairProgress, TaskSpinner};
pub use prompts::{confirm, multiselect};
