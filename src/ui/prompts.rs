//! Interactive prompts with CI/non-interactive fallback

use super::context::UiContext;
use crate::error::{RelinkError, RelinkResult};

/// Prompt for confirmation, returns default if non-interactive or auto-yes
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> RelinkResult<bool> {
    if ctx.auto_yes() {
        println!("  {} (auto-approved)", message);
        return Ok(true);
    }

    if !ctx.is_interactive() {
        return Ok(default);
    }

    let message = message.to_string();
    let result = tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message)
            .initial_value(default)
            .interact()
    })
    .await
    .map_err(|e| RelinkError::User(format!("Prompt task failed: {}", e)))?;

    result.map_err(|e| RelinkError::User(format!("Prompt failed: {}", e)))
}

/// Let the user tick any number of options.
///
/// Returns `preselected` untouched when prompts are unavailable or
/// auto-approved.
pub async fn multiselect<T>(
    ctx: &UiContext,
    message: &str,
    options: &[(T, String)],
    preselected: Vec<T>,
) -> RelinkResult<Vec<T>>
where
    T: Clone + Eq + Send + 'static,
{
    if !ctx.is_interactive() || ctx.auto_yes() || options.is_empty() {
        return Ok(preselected);
    }

    let message = message.to_string();
    let items = options.to_vec();
    let result = tokio::task::spawn_blocking(move || {
        let mut prompt = cliclack::multiselect(&message)
            .initial_values(preselected)
            .required(false);
        for (value, label) in items {
            prompt = prompt.item(value, label, "");
        }
        prompt.interact()
    })
    .await
    .map_err(|e| RelinkError::User(format!("Prompt task failed: {}", e)))?;

    result.map_err(|e| RelinkError::User(format!("Prompt failed: {}", e)))
}
