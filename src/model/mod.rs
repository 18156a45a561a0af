//! Core data types for `ghtasks`.
//!
//! - `RemoteItem` - an issue or pull request snapshot from the hosted service
//! - `Commit`, `Release` - activity records for the summary section
//! - `TaskRecord` - the in-document representation of a remote item
//! - `RepoRef`, `RepoConfig` - repository identity from frontmatter

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Remote lifecycle state. Anything but `closed` counts as open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    #[default]
    Open,
    Closed,
}

impl ItemState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issue or pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    #[default]
    Issue,
    #[serde(alias = "pr")]
    PullRequest,
}

impl ItemKind {
    /// Short token used inside rendered task lines.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::PullRequest => "pr",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = crate::error::SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "issue" => Ok(Self::Issue),
            "pr" | "pull_request" | "pull-request" => Ok(Self::PullRequest),
            other => Err(crate::error::SyncError::validation(
                "kind",
                format!("unknown item kind '{other}'"),
            )),
        }
    }
}

/// Immutable snapshot of an issue or pull request from the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteItem {
    /// Globally unique, stable id.
    pub id: u64,
    /// Repository-scoped number shown to humans.
    pub number: u64,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub state: ItemState,
    /// `owner/repo`.
    #[serde(default)]
    pub repository: String,
    #[serde(default)]
    pub labels: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub kind: ItemKind,
    /// Login of the author, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// A commit for the activity summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub message: String,
    pub url: String,
    /// Account login of the author, when the commit is linked to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_login: Option<String>,
    /// Git author name from the commit itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    pub committed_at: DateTime<Utc>,
}

impl Commit {
    /// First line of the commit message.
    #[must_use]
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

/// A published release for the activity summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub tag_name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl Release {
    /// Release name, falling back to the tag for unnamed releases.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.tag_name,
        }
    }
}

/// Canonical in-document representation of a remote item.
///
/// `id` never changes across syncs. Every other field is overwritten from
/// the latest `RemoteItem` except `tags`, which is merged with whatever the
/// user added to the line since the last sync.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub url: String,
    pub state: ItemState,
    /// `owner/repo`; empty when unknown.
    pub repository: String,
    pub kind: ItemKind,
    /// Tag names without the leading `#`.
    pub tags: BTreeSet<String>,
    pub labels: Vec<String>,
    pub created_at: Option<NaiveDate>,
    pub closed_at: Option<NaiveDate>,
    /// Zero-based line number the record was parsed from. Not encoded.
    #[serde(skip)]
    pub position: Option<usize>,
}

impl TaskRecord {
    /// Build a record from a remote item; `tag` is the configured task tag.
    #[must_use]
    pub fn from_remote(item: &RemoteItem, tag: Option<&str>) -> Self {
        Self {
            id: item.id,
            number: item.number,
            title: single_line(&item.title),
            url: item.url.clone(),
            state: item.state,
            repository: item.repository.clone(),
            kind: item.kind,
            tags: tag.map(str::to_string).into_iter().collect(),
            labels: item.labels.clone(),
            created_at: Some(item.created_at.date_naive()),
            closed_at: item.closed_at.map(|at| at.date_naive()),
            position: None,
        }
    }

    /// Checkbox state: closed items render as done.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.state.is_closed()
    }
}

fn single_line(title: &str) -> String {
    if title.contains(['\n', '\r']) {
        title.split_whitespace().collect::<Vec<_>>().join(" ")
    } else {
        title.to_string()
    }
}

/// Repository identity `owner/repo`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    /// Parse `owner/repo`: exactly one separator, both sides non-empty.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split('/');
        let owner = parts.next()?;
        let repo = parts.next()?;
        if parts.next().is_some() || owner.is_empty() || repo.is_empty() {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoRef {
    type Err = crate::error::SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| crate::error::SyncError::InvalidRepo {
            value: s.to_string(),
        })
    }
}

/// Per-document repository configuration derived from frontmatter.
///
/// Recomputed on every scan; never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoConfig {
    pub owner: String,
    pub repo: String,
    pub sync_enabled: bool,
}

impl RepoConfig {
    #[must_use]
    pub fn repo_ref(&self) -> RepoRef {
        RepoRef {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
        }
    }
}
