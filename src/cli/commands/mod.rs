//! Command implementations.

pub mod clear_completed;
pub mod config;
pub mod refresh;
pub mod scan;
pub mod sync_repos;

use crate::cli::Cli;
use crate::config::{self as settings, CliOverrides, SyncConfig};
use crate::error::{Result, SyncError};
use crate::source::SnapshotSource;
use crate::storage::FsVault;
use crate::sync::SectionFailure;
use crate::util::time::parse_timestamp;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::debug;

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputMode {
    pub json: bool,
    pub quiet: bool,
}

impl OutputMode {
    /// Human text is suppressed in quiet mode; JSON never is.
    #[must_use]
    pub const fn show_text(&self) -> bool {
        !self.json && !self.quiet
    }
}

/// Everything a sync command needs, resolved from the global flags.
#[derive(Debug)]
pub struct CommandContext {
    pub vault: FsVault,
    pub config: SyncConfig,
    pub snapshot: Option<PathBuf>,
    pub now: DateTime<Utc>,
    pub output: OutputMode,
}

impl CommandContext {
    /// Open the vault and load the layered configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault does not exist, a config file is
    /// invalid, or `--now` cannot be parsed.
    pub fn from_cli(cli: &Cli, overrides: &CliOverrides) -> Result<Self> {
        let vault = FsVault::open(&cli.vault)?;
        let config = load_sync_config(vault.root(), cli.config.as_deref(), overrides)?;
        let now = match cli.now.as_deref() {
            Some(raw) => parse_timestamp(raw, "now")?,
            None => Utc::now(),
        };
        debug!(vault = %vault.root().display(), %now, "Resolved command context");
        Ok(Self {
            vault,
            config,
            snapshot: cli.snapshot.clone(),
            now,
            output: OutputMode {
                json: cli.json,
                quiet: cli.quiet,
            },
        })
    }

    /// The remote collaborator for this run.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NoRemoteSource`] without `--snapshot`, or an error
    /// if the snapshot cannot be loaded.
    pub fn source(&self) -> Result<SnapshotSource> {
        let path = self.snapshot.as_deref().ok_or(SyncError::NoRemoteSource)?;
        SnapshotSource::from_path(path)
    }
}

/// Merge every config layer and build the typed config.
///
/// # Errors
///
/// Returns an error if a layer cannot be loaded or holds an invalid value.
pub fn load_sync_config(
    vault: &Path,
    explicit: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<SyncConfig> {
    let layer = settings::load_config(vault, explicit, overrides)?;
    SyncConfig::from_layer(&layer)
}

/// Print section failures as indented warnings.
pub(crate) fn print_section_failures(failures: &[SectionFailure]) {
    for failure in failures {
        println!(
            "  ! {} [{}]: {}",
            failure.path, failure.section, failure.reason
        );
    }
}

pub(crate) const fn changed_label(changed: bool) -> &'static str {
    if changed { "updated" } else { "unchanged" }
}
