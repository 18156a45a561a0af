use super::{CommandContext, changed_label, print_section_failures};
use crate::error::Result;
use crate::storage::DocumentStore;
use crate::sync::{self, NoteReport, SyncReport};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Serialize)]
struct RefreshOutput {
    tasks_note: String,
    tasks_note_found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tasks: Option<NoteReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    repositories: Option<SyncReport>,
}

/// Execute the refresh command.
///
/// A missing tasks note is skipped with a warning. Repository notes are
/// synced only when per-note sync is enabled.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be loaded or the tasks note
/// cannot be read or written.
pub fn execute(ctx: &mut CommandContext) -> Result<()> {
    let source = ctx.source()?;
    let config = &ctx.config;
    let path = config.tasks_note_path();

    let tasks = if ctx.vault.exists(&path) {
        Some(sync::sync_tasks_note(&mut ctx.vault, &source, config)?)
    } else {
        warn!(path, "Tasks note not found, skipping");
        None
    };

    let repositories = if config.per_note_sync {
        Some(sync::sync_repo_notes(
            &mut ctx.vault,
            &source,
            config,
            ctx.now,
        )?)
    } else {
        info!("Per-note sync disabled");
        None
    };

    let output = RefreshOutput {
        tasks_note_found: tasks.is_some(),
        tasks_note: path,
        tasks,
        repositories,
    };

    if ctx.output.json {
        println!("{}", serde_json::to_string(&output)?);
    } else if ctx.output.show_text() {
        match &output.tasks {
            Some(report) => {
                println!("{}: {}", report.path, changed_label(report.changed));
                print_section_failures(&report.section_failures);
            }
            None => println!("{}: not found, skipped", output.tasks_note),
        }
        if let Some(report) = &output.repositories {
            super::sync_repos::print_report(report);
        }
    }
    Ok(())
}
