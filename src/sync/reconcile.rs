//! Task reconciler.
//!
//! Merges freshly fetched remote items with the task lines already present in
//! a document and produces the inner content of a managed section.

use crate::config::SyncConfig;
use crate::format::{parse_line_with, render_line};
use crate::model::{RemoteItem, TaskRecord};
use std::collections::HashMap;
use tracing::debug;

/// A managed task list: section id, heading and empty-state text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagedList {
    pub id: &'static str,
    pub header: &'static str,
    pub placeholder: &'static str,
}

/// Open issues of a repository note.
pub const OPEN_ISSUES: ManagedList = ManagedList {
    id: "issues",
    header: "GitHub: Open Issues",
    placeholder: "_No open issues_",
};

/// Open pull requests of a repository note.
pub const OPEN_PULL_REQUESTS: ManagedList = ManagedList {
    id: "prs",
    header: "GitHub: Open Pull Requests",
    placeholder: "_No open pull requests_",
};

/// Issues assigned to the user, in the aggregated tasks note.
pub const ASSIGNED_ISSUES: ManagedList = ManagedList {
    id: "assigned-issues",
    header: "GitHub: Issues",
    placeholder: "_No issues_",
};

/// Pull requests involving the user, in the aggregated tasks note.
pub const ASSIGNED_PULL_REQUESTS: ManagedList = ManagedList {
    id: "assigned-prs",
    header: "GitHub: Pull Requests",
    placeholder: "_No pull requests_",
};

/// Existing task records of a document, keyed by remote id.
///
/// Built from a linear scan of every line. When an id occurs more than once
/// the last occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct TaskIndex {
    records: HashMap<u64, TaskRecord>,
}

impl TaskIndex {
    #[must_use]
    pub fn from_document(document: &str) -> Self {
        Self::with_configured_tag(document, None)
    }

    /// Index `document` for a vault whose lines carry `configured_tag`.
    #[must_use]
    pub fn with_configured_tag(document: &str, configured_tag: Option<&str>) -> Self {
        let mut records = HashMap::new();
        for (position, line) in document.lines().enumerate() {
            let Some(record) = parse_line_with(line, position, configured_tag) else {
                continue;
            };
            let id = record.id;
            if let Some(previous) = records.insert(id, record) {
                debug!(
                    id,
                    earlier = ?previous.position,
                    later = position,
                    "Duplicate task id, keeping the later line"
                );
            }
        }
        Self { records }
    }

    #[must_use]
    pub fn get(&self, id: u64) -> Option<&TaskRecord> {
        self.records.get(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Render the block for `items`, carrying over tags from `document`.
///
/// Remote order is preserved. Closed items are dropped when
/// `auto-clear-completed` is on. An empty result renders the list's
/// placeholder so a synced-but-empty section is distinguishable from a
/// missing one.
#[must_use]
pub fn reconcile(
    document: &str,
    items: &[RemoteItem],
    config: &SyncConfig,
    list: &ManagedList,
) -> String {
    let style = config.line_style();
    let index = TaskIndex::with_configured_tag(document, style.task_tag.as_deref());
    render_block(&index, items, config, list)
}

/// [`reconcile`] against a prebuilt index.
#[must_use]
pub fn render_block(
    index: &TaskIndex,
    items: &[RemoteItem],
    config: &SyncConfig,
    list: &ManagedList,
) -> String {
    let style = config.line_style();
    let lines: Vec<String> = items
        .iter()
        .map(|item| TaskRecord::from_remote(item, style.task_tag.as_deref()))
        .filter(|record| !(config.auto_clear_completed && record.is_completed()))
        .map(|record| render_line(&record, &style, index.get(record.id)))
        .collect();

    debug!(
        section = list.id,
        items = items.len(),
        rendered = lines.len(),
        known = index.len(),
        "Reconciled task list"
    );

    if lines.is_empty() {
        list.placeholder.to_string()
    } else {
        lines.join("\n")
    }
}
