//! CLI argument definitions using clap derive

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// relink - repair shortcuts whose targets have moved
///
/// Finds shortcuts whose target no longer exists and points them at a file
/// with the same name found on any mounted volume.
#[derive(Parser, Debug)]
#[command(name = "relink")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "RELINK_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Repair broken shortcuts under a directory
    Fix(FixArgs),

    /// Search the volumes for a file name
    Locate(LocateArgs),

    /// Show which volumes would be searched
    Volumes(VolumesArgs),

    /// Show or edit configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Volume selection shared by commands that search
#[derive(Args, Debug, Default, Clone)]
pub struct VolumeArgs {
    /// Search only this volume root (repeatable; replaces discovery)
    #[arg(long = "volume", value_name = "PATH")]
    pub volumes: Vec<PathBuf>,

    /// Never search this volume root (repeatable)
    #[arg(long = "exclude", value_name = "PATH")]
    pub exclude: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct FixArgs {
    /// Directory scanned for shortcuts (defaults to the home directory)
    pub root: Option<PathBuf>,

    #[command(flatten)]
    pub volumes: VolumeArgs,

    /// Show what would change without rewriting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation prompts
    #[arg(short, long)]
    pub yes: bool,

    /// Give up on a lookup after N seconds (0 = never)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Shortcuts repaired concurrently
    #[arg(short = 'j', long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: Option<u16>,

    /// Also repair dangling symbolic links
    #[arg(long)]
    pub symlinks: bool,
}

#[derive(Parser, Debug)]
pub struct LocateArgs {
    /// File name to look for
    pub basename: String,

    #[command(flatten)]
    pub volumes: VolumeArgs,

    /// Give up after N seconds (0 = never)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(Parser, Debug)]
pub struct VolumesArgs {
    /// Never search this volume root (repeatable)
    #[arg(long, value_name = "PATH")]
    pub exclude: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., locate.timeout_secs)
        key: String,
        /// Value to set; lists are comma separated
        value: String,
    },
}

#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
