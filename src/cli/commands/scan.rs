use super::CommandContext;
use crate::error::Result;
use crate::storage::scan_repo_notes;

/// Execute the scan command: list notes that will be synced.
///
/// # Errors
///
/// Returns an error if the vault cannot be enumerated.
pub fn execute(ctx: &CommandContext) -> Result<()> {
    let notes = scan_repo_notes(&ctx.vault, &ctx.config)?;

    if ctx.output.json {
        println!("{}", serde_json::to_string(&notes)?);
    } else if ctx.output.show_text() {
        if notes.is_empty() {
            println!("No repository notes found.");
        }
        for note in &notes {
            println!("{}\t{}", note.path, note.config.repo_ref());
        }
    }
    Ok(())
}
