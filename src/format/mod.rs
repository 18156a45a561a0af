//! Task line codec.
//!
//! A task line is a markdown checkbox item whose first token is a link to the
//! remote item, followed by tags, optional dates and a machine-readable
//! metadata fragment. Two dialects are supported:
//!
//! - [`TaskFormat::Tasks`] - emoji dates and a trailing `<!-- gh ... -->` comment
//! - [`TaskFormat::Dataview`] - `[key:: value]` inline fields
//!
//! [`parse_line`] detects the dialect on its own, so switching the configured
//! format converts existing lines on the next sync instead of orphaning them.
//!
//! Managed lines are regenerated on every sync. Hand-added tags survive; any
//! other hand edit does not. That includes Dataview inline fields such as
//! `[priority:: high]` and Tasks emoji such as `📅 2024-05-01` or `⏫`. Keep
//! such annotations on a line outside the managed block.

mod dataview;
pub mod scan;
mod tasks;

use crate::error::SyncError;
use crate::model::{ItemKind, ItemState, TaskRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Line dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFormat {
    #[default]
    Tasks,
    Dataview,
}

impl TaskFormat {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Dataview => "dataview",
        }
    }
}

impl fmt::Display for TaskFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskFormat {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tasks" => Ok(Self::Tasks),
            "dataview" => Ok(Self::Dataview),
            other => Err(SyncError::InvalidFormat {
                value: other.to_string(),
            }),
        }
    }
}

/// Rendering options, derived from the sync configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineStyle {
    pub format: TaskFormat,
    /// Tag name without `#`, already sanitized. Always rendered first.
    pub task_tag: Option<String>,
    pub import_labels: bool,
    pub repository_description: bool,
    pub repository_tags: bool,
    pub show_created_at: bool,
    pub show_completed_at: bool,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            format: TaskFormat::Tasks,
            task_tag: Some("github".to_string()),
            import_labels: false,
            repository_description: false,
            repository_tags: false,
            show_created_at: false,
            show_completed_at: true,
        }
    }
}

/// Machine fields shared by both dialects' metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Metadata {
    id: u64,
    kind: ItemKind,
    repository: String,
    number: u64,
    labels: Vec<String>,
    /// The line carries the generated repository tag.
    repo_tag: bool,
}

/// What a dialect parser extracted from the text after the link.
#[derive(Debug, Clone, Default)]
struct Decoded {
    meta: Metadata,
    created_at: Option<NaiveDate>,
    closed_at: Option<NaiveDate>,
    /// Text with dialect syntax removed; scanned for tags.
    remainder: String,
}

/// Parse one line into a record.
///
/// Returns `None` for prose, plain bullets, checkbox items without a title
/// link, and lines without a numeric remote id. Never fails otherwise:
/// missing optional fields fall back to defaults.
#[must_use]
pub fn parse_line(line: &str, position: usize) -> Option<TaskRecord> {
    parse_line_with(line, position, None)
}

/// [`parse_line`] for a vault with `configured_tag` set.
///
/// The configured tag is always kept in the record's tags, even when a label
/// or the repository sanitizes to the same name.
#[must_use]
pub fn parse_line_with(
    line: &str,
    position: usize,
    configured_tag: Option<&str>,
) -> Option<TaskRecord> {
    let parts = scan::split_task_line(line)?;
    let decoded = tasks::decode(parts.rest).or_else(|| dataview::decode(parts.rest))?;
    Some(assemble(parts, decoded, position, configured_tag))
}

fn assemble(
    parts: scan::LineParts<'_>,
    decoded: Decoded,
    position: usize,
    configured_tag: Option<&str>,
) -> TaskRecord {
    let Decoded {
        meta,
        created_at,
        closed_at,
        remainder,
    } = decoded;

    let derived = derived_tags(&meta, configured_tag);
    let tags: BTreeSet<String> = scan::extract_tags(&remainder)
        .into_iter()
        .filter(|tag| !derived.contains(tag))
        .collect();

    TaskRecord {
        id: meta.id,
        number: meta.number,
        title: parts.title,
        url: parts.url.to_string(),
        state: if parts.completed {
            ItemState::Closed
        } else {
            ItemState::Open
        },
        repository: meta.repository,
        kind: meta.kind,
        tags,
        labels: meta.labels,
        created_at,
        closed_at,
        position: Some(position),
    }
}

/// Tags the line itself generated from repository and labels; regenerated
/// on every render. The repository tag counts only when the metadata says it
/// was rendered, and the configured tag never counts.
fn derived_tags(meta: &Metadata, configured_tag: Option<&str>) -> BTreeSet<String> {
    let mut derived: BTreeSet<String> = meta
        .labels
        .iter()
        .filter_map(|l| scan::sanitize_tag(l))
        .collect();
    if meta.repo_tag {
        if let Some(repo_tag) = scan::sanitize_tag(&meta.repository) {
            derived.insert(repo_tag);
        }
    }
    if let Some(tag) = configured_tag {
        derived.remove(tag);
    }
    derived
}

/// Render a record as exactly one line in the configured dialect.
///
/// `prior` is the record previously parsed for the same id, if any. Its
/// user-added tags are carried over.
#[must_use]
pub fn render_line(record: &TaskRecord, style: &LineStyle, prior: Option<&TaskRecord>) -> String {
    let tags = effective_tags(record, style, prior);
    let mut line = format!(
        "- [{}] [{}]({})",
        if record.is_completed() { 'x' } else { ' ' },
        scan::escape_title(&record.title),
        record.url
    );
    if style.repository_description && !record.repository.is_empty() {
        line.push_str(&format!(" ({})", record.repository));
    }
    for tag in &tags {
        line.push_str(" #");
        line.push_str(tag);
    }
    match style.format {
        TaskFormat::Tasks => tasks::render_tail(&mut line, record, style),
        TaskFormat::Dataview => dataview::render_tail(&mut line, record, style),
    }
    line
}

/// Tags in render order: configured tag, then user and record tags sorted,
/// then repository and label tags when enabled. No duplicates.
fn effective_tags(record: &TaskRecord, style: &LineStyle, prior: Option<&TaskRecord>) -> Vec<String> {
    let configured = style.task_tag.as_deref();
    let mut free: BTreeSet<&str> = record.tags.iter().map(String::as_str).collect();
    if let Some(prior) = prior {
        free.extend(prior.tags.iter().map(String::as_str));
    }

    let mut ordered: Vec<String> = Vec::with_capacity(free.len() + record.labels.len() + 2);
    let mut push = |tag: String| {
        if !ordered.contains(&tag) {
            ordered.push(tag);
        }
    };

    if let Some(tag) = configured {
        push(tag.to_string());
    }
    for tag in free {
        push(tag.to_string());
    }
    if let Some(tag) = repo_tag(record, style) {
        push(tag);
    }
    if style.import_labels {
        for label in &record.labels {
            if let Some(tag) = scan::sanitize_tag(label) {
                push(tag);
            }
        }
    }
    ordered
}

/// The generated repository tag, when the style renders one.
fn repo_tag(record: &TaskRecord, style: &LineStyle) -> Option<String> {
    if style.repository_tags {
        scan::sanitize_tag(&record.repository)
    } else {
        None
    }
}

/// Labels are part of the encoding only when label import is on.
fn encoded_labels<'a>(record: &'a TaskRecord, style: &LineStyle) -> &'a [String] {
    if style.import_labels {
        &record.labels
    } else {
        &[]
    }
}
