use super::{CommandContext, changed_label, print_section_failures};
use crate::error::Result;
use crate::sync;

/// Execute the clear-completed command.
///
/// # Errors
///
/// Returns [`crate::SyncError::DocumentNotFound`] if the tasks note is
/// missing, or an error if the snapshot cannot be loaded.
pub fn execute(ctx: &mut CommandContext) -> Result<()> {
    let source = ctx.source()?;
    let report = sync::clear_completed(&mut ctx.vault, &source, &ctx.config)?;

    if ctx.output.json {
        println!("{}", serde_json::to_string(&report)?);
    } else if ctx.output.show_text() {
        println!("{}: {}", report.path, changed_label(report.changed));
        print_section_failures(&report.section_failures);
    }
    Ok(())
}
