//! Frontmatter extraction.
//!
//! A note opts into per-repository sync with:
//!
//! ```yaml
//! ---
//! github-repo: owner/repo
//! github-sync: true   # optional, anything but `false` keeps sync on
//! ---
//! ```

use crate::model::{RepoConfig, RepoRef};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Parsed frontmatter mapping.
pub type Frontmatter = BTreeMap<String, Value>;

/// Frontmatter key naming the repository.
pub const REPO_KEY: &str = "github-repo";
/// Frontmatter key toggling sync for the note.
pub const SYNC_KEY: &str = "github-sync";

/// Extract the leading YAML block of a markdown document.
///
/// The first line must be `---` (a byte-order mark is tolerated) and the block
/// must be closed by `---` or `...`. Returns `None` for documents without a
/// block, unterminated or empty blocks, invalid YAML, and YAML that is not a
/// mapping.
#[must_use]
pub fn extract_frontmatter(input: &str) -> Option<Frontmatter> {
    let mut lines = input.lines();

    let first = lines.next()?.trim_start_matches('\u{feff}').trim_end();
    if first != "---" {
        return None;
    }

    let mut yaml_lines: Vec<&str> = Vec::new();
    let mut closed = false;
    for line in lines {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            closed = true;
            break;
        }
        yaml_lines.push(line);
    }

    if !closed || yaml_lines.is_empty() {
        return None;
    }

    parse_yaml_to_json_map(&yaml_lines.join("\n"))
}

fn parse_yaml_to_json_map(yaml: &str) -> Option<Frontmatter> {
    let yaml_value: serde_yaml::Value = match serde_yaml::from_str(yaml) {
        Ok(value) => value,
        Err(err) => {
            debug!(error = %err, "Ignoring unparseable frontmatter");
            return None;
        }
    };
    let json_value: Value = serde_json::to_value(yaml_value).ok()?;

    match json_value {
        Value::Object(map) => Some(map.into_iter().collect()),
        _ => None,
    }
}

/// Repository configuration from a pre-parsed frontmatter mapping.
///
/// `github-repo` must be a string of the exact shape `owner/repo`.
/// `github-sync` disables sync only when it is the boolean `false`.
#[must_use]
pub fn repo_config_from_mapping(frontmatter: &Frontmatter) -> Option<RepoConfig> {
    let raw = frontmatter.get(REPO_KEY)?.as_str()?;
    let Some(repo) = RepoRef::parse(raw.trim()) else {
        debug!(value = raw, "Ignoring malformed github-repo");
        return None;
    };
    let sync_enabled = !matches!(frontmatter.get(SYNC_KEY), Some(Value::Bool(false)));

    Some(RepoConfig {
        owner: repo.owner,
        repo: repo.repo,
        sync_enabled,
    })
}

/// Repository configuration straight from document text.
#[must_use]
pub fn extract_repo_config(document: &str) -> Option<RepoConfig> {
    repo_config_from_mapping(&extract_frontmatter(document)?)
}
