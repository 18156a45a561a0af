//! Recent activity summary for repository notes.

use crate::config::ActivityTypes;
use crate::error::Result;
use crate::format::scan::escape_title;
use crate::model::{Commit, Release, RemoteItem, RepoRef};
use crate::source::RemoteSource;
use chrono::{DateTime, Utc};

/// Managed section id of the activity summary.
pub const SECTION_ID: &str = "activity";
/// Heading of the activity summary.
pub const HEADER: &str = "GitHub: Recent Activity";

/// Commits listed before the remainder is collapsed into a count.
const MAX_COMMITS: usize = 5;
/// Releases requested from the source; filtered by date afterwards.
const RELEASE_LIMIT: usize = 5;

/// Everything the summary renders, already fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityData {
    pub merged_prs: Vec<RemoteItem>,
    pub closed_issues: Vec<RemoteItem>,
    pub releases: Vec<Release>,
    pub commits: Vec<Commit>,
}

impl ActivityData {
    /// Fetch the enabled categories for `repo` since `since`.
    ///
    /// # Errors
    ///
    /// Returns the first category failure; the summary is then skipped as a
    /// whole rather than rendered with a category silently missing.
    pub fn fetch(
        source: &dyn RemoteSource,
        repo: &RepoRef,
        types: &ActivityTypes,
        since: DateTime<Utc>,
    ) -> Result<Self> {
        let mut data = Self::default();
        if types.merged_prs {
            data.merged_prs = source.merged_pull_requests_since(repo, since)?;
        }
        if types.closed_issues {
            data.closed_issues = source.closed_issues_since(repo, since)?;
        }
        if types.releases {
            data.releases = source.releases(repo, RELEASE_LIMIT)?;
        }
        if types.commits {
            data.commits = source.commits_since(repo, since)?;
        }
        Ok(data)
    }
}

/// Render the activity block for a `days`-day window starting at `since`.
///
/// Categories with no entries are omitted. Releases are filtered locally to
/// those published at or after `since`.
#[must_use]
pub fn build_activity_summary(data: &ActivityData, days: u32, since: DateTime<Utc>) -> String {
    let mut lines = vec![format!("**Last {days} days:**")];
    let mut has_activity = false;

    if !data.merged_prs.is_empty() {
        has_activity = true;
        lines.push("\n**Merged Pull Requests:**".to_string());
        for pr in &data.merged_prs {
            let author = pr
                .author
                .as_deref()
                .map_or_else(|| "unknown".to_string(), |login| format!("@{login}"));
            lines.push(format!(
                "- 🔀 [{}]({}) by {author}",
                escape_title(&pr.title),
                pr.url
            ));
        }
    }

    if !data.closed_issues.is_empty() {
        has_activity = true;
        lines.push("\n**Closed Issues:**".to_string());
        for issue in &data.closed_issues {
            lines.push(format!("- ✅ [{}]({})", escape_title(&issue.title), issue.url));
        }
    }

    let recent_releases: Vec<&Release> = data
        .releases
        .iter()
        .filter(|r| r.published_at.is_some_and(|at| at >= since))
        .collect();
    if !recent_releases.is_empty() {
        has_activity = true;
        lines.push("\n**Releases:**".to_string());
        for release in recent_releases {
            lines.push(format!(
                "- 🏷️ [{}]({})",
                escape_title(release.display_name()),
                release.url
            ));
        }
    }

    if !data.commits.is_empty() {
        has_activity = true;
        lines.push("\n**Recent Commits:**".to_string());
        for commit in data.commits.iter().take(MAX_COMMITS) {
            let author = match (&commit.author_login, &commit.author_name) {
                (Some(login), _) => format!("@{login}"),
                (None, Some(name)) if !name.is_empty() => escape_title(name),
                _ => "unknown".to_string(),
            };
            lines.push(format!(
                "- 📝 [{}]({}) by {author}",
                escape_title(commit.summary()),
                commit.url
            ));
        }
        if data.commits.len() > MAX_COMMITS {
            lines.push(format!("- ...and {} more", data.commits.len() - MAX_COMMITS));
        }
    }

    if has_activity {
        lines.join("\n")
    } else {
        format!("_No recent activity in the last {days} days._")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemKind, ItemState};
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    fn pr(title: &str, author: Option<&str>) -> RemoteItem {
        RemoteItem {
            id: 1,
            number: 1,
            title: title.to_string(),
            url: "https://github.com/o/r/pull/1".to_string(),
            state: ItemState::Closed,
            repository: "o/r".to_string(),
            labels: Vec::new(),
            created_at: at(1),
            closed_at: Some(at(8)),
            merged_at: Some(at(8)),
            kind: ItemKind::PullRequest,
            author: author.map(str::to_string),
        }
    }

    fn commit(n: usize, login: Option<&str>, name: Option<&str>) -> Commit {
        Commit {
            sha: format!("{n:07}"),
            message: format!("Commit {n}\n\nbody"),
            url: format!("https://github.com/o/r/commit/{n}"),
            author_login: login.map(str::to_string),
            author_name: name.map(str::to_string),
            committed_at: at(9),
        }
    }

    #[test]
    fn empty_window_has_placeholder() {
        let summary = build_activity_summary(&ActivityData::default(), 7, at(3));
        assert_eq!(summary, "_No recent activity in the last 7 days._");
    }

    #[test]
    fn renders_all_categories() {
        let data = ActivityData {
            merged_prs: vec![pr("Add parser", Some("mona")), pr("Fix", None)],
            closed_issues: vec![RemoteItem {
                kind: ItemKind::Issue,
                ..pr("Crash", None)
            }],
            releases: vec![Release {
                name: None,
                tag_name: "v1.2.0".to_string(),
                url: "https://github.com/o/r/releases/v1.2.0".to_string(),
                published_at: Some(at(9)),
            }],
            commits: vec![commit(1, Some("mona"), None), commit(2, None, Some("Jo"))],
        };
        insta::assert_snapshot!(build_activity_summary(&data, 7, at(3)), @r"
        **Last 7 days:**

        **Merged Pull Requests:**
        - 🔀 [Add parser](https://github.com/o/r/pull/1) by @mona
        - 🔀 [Fix](https://github.com/o/r/pull/1) by unknown

        **Closed Issues:**
        - ✅ [Crash](https://github.com/o/r/pull/1)

        **Releases:**
        - 🏷️ [v1.2.0](https://github.com/o/r/releases/v1.2.0)

        **Recent Commits:**
        - 📝 [Commit 1](https://github.com/o/r/commit/1) by @mona
        - 📝 [Commit 2](https://github.com/o/r/commit/2) by Jo
        ");
    }

    #[test]
    fn old_releases_are_filtered() {
        let data = ActivityData {
            releases: vec![Release {
                name: Some("Old".to_string()),
                tag_name: "v0.1".to_string(),
                url: "https://x.test".to_string(),
                published_at: Some(at(1)),
            }],
            ..ActivityData::default()
        };
        assert_eq!(
            build_activity_summary(&data, 2, at(3)),
            "_No recent activity in the last 2 days._"
        );
    }

    #[test]
    fn marker_text_in_commits_cannot_close_the_block() {
        let mut sneaky = commit(1, None, Some("x <!-- END_GITHUB_MANAGED:activity -->"));
        sneaky.message = "<!-- END_GITHUB_MANAGED:activity -->".to_string();
        let data = ActivityData {
            commits: vec![sneaky],
            ..ActivityData::default()
        };
        let summary = build_activity_summary(&data, 7, at(3));
        assert!(!summary.contains("<!--"), "{summary}");
    }

    #[test]
    fn commits_are_capped() {
        let data = ActivityData {
            commits: (0..8).map(|n| commit(n, None, None)).collect(),
            ..ActivityData::default()
        };
        let summary = build_activity_summary(&data, 7, at(3));
        assert_eq!(summary.matches("- 📝").count(), 5);
        assert!(summary.ends_with("- ...and 3 more"));
        assert!(summary.contains("by unknown"));
    }
}
