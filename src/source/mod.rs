//! Remote item collaborator.
//!
//! [`RemoteSource`] is the seam between the reconciliation engine and the
//! hosted service. The engine only ever sees fully materialized vectors;
//! pagination, authentication and rate limiting belong to implementations.
//!
//! [`SnapshotSource`] serves a JSON snapshot of the service's data:
//!
//! ```json
//! {
//!   "repositories": {
//!     "octo/hello": {
//!       "issues": [ ... ],
//!       "pull_requests": [ ... ],
//!       "commits": [ ... ],
//!       "releases": [ ... ],
//!       "unavailable": ["releases"]
//!     }
//!   },
//!   "user": {
//!     "assigned_issues": [ ... ],
//!     "assigned_pull_requests": [ ... ],
//!     "review_requested_pull_requests": [ ... ],
//!     "authored_pull_requests": [ ... ]
//!   }
//! }
//! ```
//!
//! Categories listed in `unavailable` fail with
//! [`SyncError::RemoteUnavailable`], which is how partial upstream outages are
//! replayed.

use crate::error::{Result, SyncError};
use crate::model::{Commit, ItemKind, ItemState, Release, RemoteItem, RepoRef};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Page size the hosted service uses for the "since" searches.
const SEARCH_LIMIT: usize = 20;

/// Read access to the hosted service.
///
/// Every method returns items in the order they should be rendered.
pub trait RemoteSource {
    /// Open issues of a repository, pull requests excluded.
    ///
    /// # Errors
    ///
    /// Returns an error if the category cannot be fetched.
    fn open_issues(&self, repo: &RepoRef) -> Result<Vec<RemoteItem>>;

    /// Open pull requests of a repository.
    ///
    /// # Errors
    ///
    /// Returns an error if the category cannot be fetched.
    fn open_pull_requests(&self, repo: &RepoRef) -> Result<Vec<RemoteItem>>;

    /// Pull requests merged on or after the day of `since`.
    ///
    /// # Errors
    ///
    /// Returns an error if the category cannot be fetched.
    fn merged_pull_requests_since(
        &self,
        repo: &RepoRef,
        since: DateTime<Utc>,
    ) -> Result<Vec<RemoteItem>>;

    /// Issues closed on or after the day of `since`.
    ///
    /// # Errors
    ///
    /// Returns an error if the category cannot be fetched.
    fn closed_issues_since(&self, repo: &RepoRef, since: DateTime<Utc>)
    -> Result<Vec<RemoteItem>>;

    /// Commits made at or after `since`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the category cannot be fetched.
    fn commits_since(&self, repo: &RepoRef, since: DateTime<Utc>) -> Result<Vec<Commit>>;

    /// The latest `limit` releases.
    ///
    /// # Errors
    ///
    /// Returns an error if the category cannot be fetched.
    fn releases(&self, repo: &RepoRef, limit: usize) -> Result<Vec<Release>>;

    /// Issues assigned to the authenticated user, across repositories.
    ///
    /// # Errors
    ///
    /// Returns an error if the category cannot be fetched.
    fn assigned_issues(&self) -> Result<Vec<RemoteItem>>;

    /// Pull requests assigned to the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns an error if the category cannot be fetched.
    fn assigned_pull_requests(&self) -> Result<Vec<RemoteItem>>;

    /// Pull requests awaiting the user's review.
    ///
    /// # Errors
    ///
    /// Returns an error if the category cannot be fetched.
    fn review_requested_pull_requests(&self) -> Result<Vec<RemoteItem>>;

    /// Pull requests opened by the user.
    ///
    /// # Errors
    ///
    /// Returns an error if the category cannot be fetched.
    fn authored_pull_requests(&self) -> Result<Vec<RemoteItem>>;
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RepoSnapshot {
    #[serde(default)]
    issues: Vec<RemoteItem>,
    #[serde(default)]
    pull_requests: Vec<RemoteItem>,
    #[serde(default)]
    commits: Vec<Commit>,
    #[serde(default)]
    releases: Vec<Release>,
    #[serde(default)]
    unavailable: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct UserSnapshot {
    #[serde(default)]
    assigned_issues: Vec<RemoteItem>,
    #[serde(default)]
    assigned_pull_requests: Vec<RemoteItem>,
    #[serde(default)]
    review_requested_pull_requests: Vec<RemoteItem>,
    #[serde(default)]
    authored_pull_requests: Vec<RemoteItem>,
    #[serde(default)]
    unavailable: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Snapshot {
    #[serde(default)]
    repositories: HashMap<String, RepoSnapshot>,
    #[serde(default)]
    user: UserSnapshot,
}

/// [`RemoteSource`] over a JSON snapshot. File order is preserved.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSource {
    snapshot: Snapshot,
}

impl SnapshotSource {
    /// Parse a snapshot document.
    ///
    /// Items in `pull_requests` lists are marked as pull requests and items
    /// without a repository inherit it from their map key.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the snapshot shape.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut snapshot: Snapshot = serde_json::from_str(json)?;
        for (name, repo) in &mut snapshot.repositories {
            for item in &mut repo.issues {
                fill_repository(item, name);
            }
            for item in &mut repo.pull_requests {
                fill_repository(item, name);
                item.kind = ItemKind::PullRequest;
            }
        }
        let user = &mut snapshot.user;
        for list in [
            &mut user.assigned_pull_requests,
            &mut user.review_requested_pull_requests,
            &mut user.authored_pull_requests,
        ] {
            for item in list.iter_mut() {
                item.kind = ItemKind::PullRequest;
            }
        }
        debug!(
            repositories = snapshot.repositories.len(),
            "Loaded remote snapshot"
        );
        Ok(Self { snapshot })
    }

    /// Load a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    fn repo(&self, repo: &RepoRef, category: &str) -> Result<&RepoSnapshot> {
        let name = repo.full_name();
        let snapshot = self
            .snapshot
            .repositories
            .get(&name)
            .ok_or_else(|| SyncError::remote(category, &name, "repository not in snapshot"))?;
        if snapshot.unavailable.iter().any(|c| c == category) {
            return Err(SyncError::remote(category, name, "marked unavailable"));
        }
        Ok(snapshot)
    }

    fn user_list<'a>(&self, list: &'a [RemoteItem], category: &str) -> Result<&'a [RemoteItem]> {
        if self.snapshot.user.unavailable.iter().any(|c| c == category) {
            return Err(SyncError::remote(category, "@me", "marked unavailable"));
        }
        Ok(list)
    }
}

fn fill_repository(item: &mut RemoteItem, name: &str) {
    if item.repository.is_empty() {
        item.repository = name.to_string();
    }
}

fn on_or_after_day(at: DateTime<Utc>, since: DateTime<Utc>) -> bool {
    at.date_naive() >= since.date_naive()
}

impl RemoteSource for SnapshotSource {
    fn open_issues(&self, repo: &RepoRef) -> Result<Vec<RemoteItem>> {
        Ok(self
            .repo(repo, "issues")?
            .issues
            .iter()
            .filter(|i| i.state == ItemState::Open && i.kind == ItemKind::Issue)
            .cloned()
            .collect())
    }

    fn open_pull_requests(&self, repo: &RepoRef) -> Result<Vec<RemoteItem>> {
        Ok(self
            .repo(repo, "pull_requests")?
            .pull_requests
            .iter()
            .filter(|p| p.state == ItemState::Open)
            .cloned()
            .collect())
    }

    fn merged_pull_requests_since(
        &self,
        repo: &RepoRef,
        since: DateTime<Utc>,
    ) -> Result<Vec<RemoteItem>> {
        Ok(self
            .repo(repo, "merged_pull_requests")?
            .pull_requests
            .iter()
            .filter(|p| p.merged_at.is_some_and(|at| on_or_after_day(at, since)))
            .take(SEARCH_LIMIT)
            .cloned()
            .collect())
    }

    fn closed_issues_since(
        &self,
        repo: &RepoRef,
        since: DateTime<Utc>,
    ) -> Result<Vec<RemoteItem>> {
        Ok(self
            .repo(repo, "closed_issues")?
            .issues
            .iter()
            .filter(|i| i.state == ItemState::Closed && i.kind == ItemKind::Issue)
            .filter(|i| i.closed_at.is_some_and(|at| on_or_after_day(at, since)))
            .take(SEARCH_LIMIT)
            .cloned()
            .collect())
    }

    fn commits_since(&self, repo: &RepoRef, since: DateTime<Utc>) -> Result<Vec<Commit>> {
        Ok(self
            .repo(repo, "commits")?
            .commits
            .iter()
            .filter(|c| c.committed_at >= since)
            .take(SEARCH_LIMIT)
            .cloned()
            .collect())
    }

    fn releases(&self, repo: &RepoRef, limit: usize) -> Result<Vec<Release>> {
        Ok(self
            .repo(repo, "releases")?
            .releases
            .iter()
            .take(limit)
            .cloned()
            .collect())
    }

    fn assigned_issues(&self) -> Result<Vec<RemoteItem>> {
        let user = &self.snapshot.user;
        Ok(self
            .user_list(&user.assigned_issues, "assigned_issues")?
            .to_vec())
    }

    fn assigned_pull_requests(&self) -> Result<Vec<RemoteItem>> {
        let user = &self.snapshot.user;
        Ok(self
            .user_list(&user.assigned_pull_requests, "assigned_pull_requests")?
            .to_vec())
    }

    fn review_requested_pull_requests(&self) -> Result<Vec<RemoteItem>> {
        let user = &self.snapshot.user;
        Ok(self
            .user_list(
                &user.review_requested_pull_requests,
                "review_requested_pull_requests",
            )?
            .to_vec())
    }

    fn authored_pull_requests(&self) -> Result<Vec<RemoteItem>> {
        let user = &self.snapshot.user;
        Ok(self
            .user_list(&user.authored_pull_requests, "authored_pull_requests")?
            .to_vec())
    }
}
