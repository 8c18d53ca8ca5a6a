//! relink - repair shortcuts whose targets have moved
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use relink::cli::{Cli, Commands};
use relink::config::{Config, ConfigManager};
use relink::error::RelinkResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> RelinkResult<()> {
    let cli = Cli::parse();

    if let Commands::Completions(args) = cli.command {
        return relink::cli::commands::completions(args);
    }

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config);
    debug!("Using config {}", config_manager.path().display());

    match cli.command {
        Commands::Completions(_) => unreachable!("Completions handled above"),
        Commands::Fix(args) => relink::cli::commands::fix(args, &config).await,
        Commands::Locate(args) => relink::cli::commands::locate(args, &config).await,
        Commands::Volumes(args) => relink::cli::commands::volumes(args, &config).await,
        Commands::Config(args) => {
            relink::cli::commands::config(args, &config_manager, &config).await
        }
    }
}

/// 0 = warn, 1 = info, 2+ = debug; `general.verbose` counts as one `-v`
fn init_logging(verbose: u8, config: &Config) {
    let level = verbose.max(u8::from(config.general.verbose));
    let filter = match level {
        0 => EnvFilter::new("relink=warn"),
        1 => EnvFilter::new("relink=info"),
        _ => EnvFilter::new("relink=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
