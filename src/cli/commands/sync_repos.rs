use super::{CommandContext, print_section_failures};
use crate::cli::SyncReposArgs;
use crate::error::Result;
use crate::sync::{self, SyncReport};
use serde::Serialize;
use tracing::info;

#[derive(Serialize)]
struct SyncReposOutput {
    skipped: bool,
    #[serde(flatten)]
    report: SyncReport,
}

/// Execute the sync-repos command.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be loaded or the vault cannot be
/// enumerated. Individual note failures are reported, not returned.
pub fn execute(args: &SyncReposArgs, ctx: &mut CommandContext) -> Result<()> {
    if !args.force && !ctx.config.per_note_sync {
        info!("Per-note sync disabled and --force not given");
        if ctx.output.json {
            let output = SyncReposOutput {
                skipped: true,
                report: SyncReport::default(),
            };
            println!("{}", serde_json::to_string(&output)?);
        } else if ctx.output.show_text() {
            println!("Per-note sync is disabled (per-note-sync: false). Use --force to sync anyway.");
        }
        return Ok(());
    }

    let source = ctx.source()?;
    let report = sync::sync_repo_notes(&mut ctx.vault, &source, &ctx.config, ctx.now)?;

    if ctx.output.json {
        let output = SyncReposOutput {
            skipped: false,
            report,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if ctx.output.show_text() {
        print_report(&report);
    }
    Ok(())
}

pub(crate) fn print_report(report: &SyncReport) {
    println!(
        "Repository notes: {} scanned, {} updated, {} unchanged, {} failed",
        report.scanned, report.updated, report.unchanged, report.failed
    );
    print_section_failures(&report.section_failures);
    for failure in &report.document_failures {
        println!("  ! {}: {}", failure.path, failure.reason);
    }
}
