//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{RelinkError, RelinkResult};
use crate::ui::{self, UiContext};
use std::path::PathBuf;

/// Keys accepted by `relink config set`
const VALID_KEYS: &[&str] = &[
    "general.verbose",
    "general.log_format",
    "general.change_log",
    "general.change_log_path",
    "volumes.include",
    "volumes.exclude",
    "volumes.prompt",
    "locate.timeout_secs",
    "locate.follow_links",
    "repair.root",
    "repair.concurrency",
    "repair.extensions",
    "repair.symlinks",
    "repair.dry_run",
];

pub async fn execute(args: ConfigArgs, manager: &ConfigManager, config: &Config) -> RelinkResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => {
            let mut updated = config.clone();
            set_value(&mut updated, &key, &value)?;
            manager.save(&updated).await?;
            ui::step_ok(&UiContext::detect(), &format!("Set {} = {}", key, value));
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> RelinkResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> RelinkResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn(
            &ctx,
            &format!(
                "Config already exists at {} - use --force to overwrite",
                path.display()
            ),
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::step_ok(
        &ctx,
        &format!("Configuration initialized at {}", path.display()),
    );
    Ok(())
}

/// Apply a dot-separated key to `config`
fn set_value(config: &mut Config, key: &str, value: &str) -> RelinkResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "verbose"] => config.general.verbose = parse_bool(value)?,
        ["general", "log_format"] => config.general.log_format = parse_log_format(value)?,
        ["general", "change_log"] => config.general.change_log = parse_bool(value)?,
        ["general", "change_log_path"] => config.general.change_log_path = parse_optional_path(value),

        ["volumes", "include"] => config.volumes.include = parse_list(value).map(PathBuf::from).collect(),
        ["volumes", "exclude"] => config.volumes.exclude = parse_list(value).map(PathBuf::from).collect(),
        ["volumes", "prompt"] => config.volumes.prompt = parse_bool(value)?,

        ["locate", "timeout_secs"] => config.locate.timeout_secs = parse_number(value)?,
        ["locate", "follow_links"] => config.locate.follow_links = parse_bool(value)?,

        ["repair", "root"] => config.repair.root = parse_optional_path(value),
        ["repair", "concurrency"] => {
            let jobs: usize = parse_number(value)?;
            if jobs == 0 {
                return Err(RelinkError::User(
                    "repair.concurrency must be at least 1".to_string(),
                ));
            }
            config.repair.concurrency = jobs;
        }
        ["repair", "extensions"] => {
            config.repair.extensions = parse_list(value)
                .map(|ext| ext.trim_start_matches('.').to_string())
                .collect()
        }
        ["repair", "symlinks"] => config.repair.symlinks = parse_bool(value)?,
        ["repair", "dry_run"] => config.repair.dry_run = parse_bool(value)?,

        _ => {
            return Err(RelinkError::User(format!(
                "Unknown config key: {}. Valid keys: {}",
                key,
                VALID_KEYS.join(", ")
            )))
        }
    }
    Ok(())
}

fn parse_bool(value: &str) -> RelinkResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(RelinkError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(value: &str) -> RelinkResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| RelinkError::User(format!("Invalid number: {}", value)))
}

fn parse_log_format(value: &str) -> RelinkResult<String> {
    match value {
        "text" | "json" => Ok(value.to_string()),
        _ => Err(RelinkError::User(format!(
            "Invalid log format: {}. Use text or json",
            value
        ))),
    }
}

/// Empty string clears the setting
fn parse_optional_path(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    (!value.is_empty()).then(|| PathBuf::from(value))
}

fn parse_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}
