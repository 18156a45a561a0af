//! Note synchronization for `ghtasks`.
//!
//! This module handles:
//! - Per-repository notes: open issues, open pull requests, recent activity
//! - The aggregated tasks note: the user's assigned issues and pull requests
//! - Batch runs over every repository note in the vault
//!
//! Each managed section is fetched and merged independently. A failed fetch
//! leaves that section exactly as it was and is reported, never raised. A
//! failed document in a batch is counted and the batch moves on.

pub mod activity;
pub mod reconcile;
pub mod section;

pub use reconcile::{
    ASSIGNED_ISSUES, ASSIGNED_PULL_REQUESTS, ManagedList, OPEN_ISSUES, OPEN_PULL_REQUESTS,
    TaskIndex, reconcile,
};
pub use section::{ManagedSection, MarkerScan, upsert_section};

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::model::{RemoteItem, RepoRef};
use crate::source::RemoteSource;
use crate::storage::{DocumentStore, scan_repo_notes};
use crate::util::time::lookback_start;
use activity::{ActivityData, build_activity_summary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};

/// A managed section that could not be refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionFailure {
    pub path: String,
    pub section: String,
    pub reason: String,
}

/// A document that could not be processed at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentFailure {
    pub path: String,
    pub reason: String,
}

/// Result of syncing one document's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSync {
    pub content: String,
    /// Section ids whose fetch failed, with the reason.
    pub failed_sections: Vec<(String, String)>,
}

impl NoteSync {
    fn new(document: &str) -> Self {
        Self {
            content: document.to_string(),
            failed_sections: Vec::new(),
        }
    }

    fn skip(&mut self, section: &str, err: &SyncError) {
        warn!(section, error = %err, "Leaving section unchanged");
        self.failed_sections
            .push((section.to_string(), err.to_string()));
    }

    fn apply_list(&mut self, list: &ManagedList, items: &[RemoteItem], config: &SyncConfig) {
        let block = reconcile(&self.content, items, config, list);
        self.content = upsert_section(&self.content, list.id, list.header, &block);
    }

    fn failures_for(&self, path: &str) -> Vec<SectionFailure> {
        self.failed_sections
            .iter()
            .map(|(section, reason)| SectionFailure {
                path: path.to_string(),
                section: section.clone(),
                reason: reason.clone(),
            })
            .collect()
    }
}

/// Outcome of syncing one stored note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteReport {
    pub path: String,
    pub changed: bool,
    pub section_failures: Vec<SectionFailure>,
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub scanned: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub section_failures: Vec<SectionFailure>,
    pub document_failures: Vec<DocumentFailure>,
}

impl SyncReport {
    fn record(&mut self, note: NoteReport) {
        if note.changed {
            self.updated += 1;
        } else {
            self.unchanged += 1;
        }
        self.section_failures.extend(note.section_failures);
    }
}

/// Refresh the managed sections of one repository note.
///
/// Issues are merged first; the pull request index is then rebuilt from the
/// document as updated by that step. The activity summary is rendered only
/// when enabled.
#[must_use]
pub fn sync_repo_note(
    document: &str,
    repo: &RepoRef,
    source: &dyn RemoteSource,
    config: &SyncConfig,
    now: DateTime<Utc>,
) -> NoteSync {
    let mut note = NoteSync::new(document);

    match source.open_issues(repo) {
        Ok(issues) => note.apply_list(&OPEN_ISSUES, &issues, config),
        Err(err) => note.skip(OPEN_ISSUES.id, &err),
    }

    match source.open_pull_requests(repo) {
        Ok(prs) => note.apply_list(&OPEN_PULL_REQUESTS, &prs, config),
        Err(err) => note.skip(OPEN_PULL_REQUESTS.id, &err),
    }

    if config.activity.enabled {
        let since = lookback_start(now, config.activity.days);
        match ActivityData::fetch(source, repo, &config.activity.types, since) {
            Ok(data) => {
                let summary = build_activity_summary(&data, config.activity.days, since);
                note.content =
                    upsert_section(&note.content, activity::SECTION_ID, activity::HEADER, &summary);
            }
            Err(err) => note.skip(activity::SECTION_ID, &err),
        }
    }

    note
}

/// Assigned, review-requested and authored pull requests, first occurrence
/// of each id wins.
///
/// # Errors
///
/// Returns the first failing fetch.
pub fn user_pull_requests(source: &dyn RemoteSource) -> Result<Vec<RemoteItem>> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for batch in [
        source.assigned_pull_requests()?,
        source.review_requested_pull_requests()?,
        source.authored_pull_requests()?,
    ] {
        for item in batch {
            if seen.insert(item.id) {
                merged.push(item);
            }
        }
    }
    Ok(merged)
}

/// Refresh the aggregated sections of the tasks note text.
#[must_use]
pub fn sync_tasks_document(
    document: &str,
    source: &dyn RemoteSource,
    config: &SyncConfig,
) -> NoteSync {
    let mut note = NoteSync::new(document);

    match source.assigned_issues() {
        Ok(issues) => note.apply_list(&ASSIGNED_ISSUES, &issues, config),
        Err(err) => note.skip(ASSIGNED_ISSUES.id, &err),
    }

    match user_pull_requests(source) {
        Ok(prs) => note.apply_list(&ASSIGNED_PULL_REQUESTS, &prs, config),
        Err(err) => note.skip(ASSIGNED_PULL_REQUESTS.id, &err),
    }

    note
}

/// Sync the configured tasks note in `store`. Writes only when changed.
///
/// # Errors
///
/// Returns [`SyncError::DocumentNotFound`] if the note does not exist, or any
/// store error from reading or writing it.
pub fn sync_tasks_note(
    store: &mut dyn DocumentStore,
    source: &dyn RemoteSource,
    config: &SyncConfig,
) -> Result<NoteReport> {
    let path = config.tasks_note_path();
    let document = store.read(&path)?;
    let note = sync_tasks_document(&document, source, config);
    let changed = note.content != document;
    if changed {
        store.write(&path, &note.content)?;
    }
    info!(path, changed, "Synced tasks note");
    Ok(NoteReport {
        section_failures: note.failures_for(&path),
        path,
        changed,
    })
}

/// Remove closed items from the tasks note.
///
/// # Errors
///
/// Same as [`sync_tasks_note`].
pub fn clear_completed(
    store: &mut dyn DocumentStore,
    source: &dyn RemoteSource,
    config: &SyncConfig,
) -> Result<NoteReport> {
    sync_tasks_note(store, source, &config.with_auto_clear())
}

fn sync_one_repo_note(
    store: &mut dyn DocumentStore,
    path: &str,
    repo: &RepoRef,
    source: &dyn RemoteSource,
    config: &SyncConfig,
    now: DateTime<Utc>,
) -> Result<NoteReport> {
    let document = store.read(path)?;
    let note = sync_repo_note(&document, repo, source, config, now);
    let changed = note.content != document;
    if changed {
        store.write(path, &note.content)?;
    }
    info!(path, repo = %repo, changed, "Synced repository note");
    Ok(NoteReport {
        path: path.to_string(),
        changed,
        section_failures: note.failures_for(path),
    })
}

/// Sync every repository note in the store, one document at a time.
///
/// # Errors
///
/// Returns an error only if the store cannot be enumerated; per-document
/// failures are counted in the report.
pub fn sync_repo_notes(
    store: &mut dyn DocumentStore,
    source: &dyn RemoteSource,
    config: &SyncConfig,
    now: DateTime<Utc>,
) -> Result<SyncReport> {
    let notes = scan_repo_notes(store, config)?;
    let mut report = SyncReport {
        scanned: notes.len(),
        ..SyncReport::default()
    };

    for note in notes {
        let repo = note.config.repo_ref();
        match sync_one_repo_note(store, &note.path, &repo, source, config, now) {
            Ok(result) => report.record(result),
            Err(err) => {
                warn!(path = note.path, error = %err, "Repository note sync failed");
                report.failed += 1;
                report.document_failures.push(DocumentFailure {
                    path: note.path,
                    reason: err.to_string(),
                });
            }
        }
    }

    info!(
        scanned = report.scanned,
        updated = report.updated,
        unchanged = report.unchanged,
        failed = report.failed,
        "Repository sync complete"
    );
    Ok(report)
}
