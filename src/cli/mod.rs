//! CLI definitions and entry point.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// Sync GitHub issues and pull requests into markdown task lists
#[derive(Parser, Debug)]
#[command(name = "ght", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault root directory
    #[arg(long, global = true, env = "GHT_VAULT", default_value = ".")]
    pub vault: PathBuf,

    /// JSON snapshot of remote issues, pull requests and activity
    #[arg(long, global = true, env = "GHT_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Extra config file, applied above user and vault config
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Task line format (tasks, dataview)
    #[arg(long, global = true)]
    pub format: Option<String>,

    /// Tag added to every synced task line
    #[arg(long, global = true)]
    pub tag: Option<String>,

    /// Reference time for the activity window (RFC 3339 or YYYY-MM-DD)
    #[arg(long, global = true, env = "GHT_NOW", hide = true)]
    pub now: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Append JSON log lines to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sync the tasks note, and repository notes when per-note sync is on
    Refresh,

    /// Sync every repository note in the vault
    SyncRepos(SyncReposArgs),

    /// Remove closed items from the tasks note
    ClearCompleted,

    /// List notes that name a repository in their frontmatter
    Scan,

    /// Inspect the effective configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct SyncReposArgs {
    /// Sync even when per-note-sync is off
    #[arg(long)]
    pub force: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Show every key with its effective value
    List,

    /// Show one value
    Get {
        /// Config key (e.g. task-tag, activity.days)
        key: String,
    },

    /// Show config file locations
    Path,
}
