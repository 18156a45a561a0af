//! Shared vault notes and remote snapshots.

/// Reference time the CLI harness passes through `GHT_NOW`.
pub const NOW: &str = "2024-03-10T12:00:00Z";

pub const SNAPSHOT: &str = r#"{
  "repositories": {
    "octo/hello": {
      "issues": [
        {"id": 1001, "number": 12, "title": "Crash on [startup]",
         "url": "https://github.com/octo/hello/issues/12",
         "created_at": "2024-03-01T09:00:00Z", "labels": ["bug", "help wanted"]},
        {"id": 1002, "number": 9, "title": "Docs typo",
         "url": "https://github.com/octo/hello/issues/9", "state": "closed",
         "created_at": "2024-02-20T09:00:00Z", "closed_at": "2024-03-05T10:00:00Z"}
      ],
      "pull_requests": [
        {"id": 2001, "number": 14, "title": "Add parser",
         "url": "https://github.com/octo/hello/pull/14",
         "created_at": "2024-03-04T00:00:00Z", "author": "mona"},
        {"id": 2002, "number": 13, "title": "Speed up",
         "url": "https://github.com/octo/hello/pull/13", "state": "closed",
         "created_at": "2024-03-01T00:00:00Z", "closed_at": "2024-03-06T00:00:00Z",
         "merged_at": "2024-03-06T00:00:00Z", "author": "hubot"}
      ],
      "commits": [
        {"sha": "abc1234", "message": "Speed up parser\n\nDetails",
         "url": "https://github.com/octo/hello/commit/abc1234",
         "author_login": "hubot", "committed_at": "2024-03-06T00:00:00Z"}
      ],
      "releases": [
        {"name": "v1.0", "tag_name": "v1.0.0",
         "url": "https://github.com/octo/hello/releases/tag/v1.0.0",
         "published_at": "2024-03-07T00:00:00Z"}
      ]
    },
    "octo/broken": {
      "unavailable": ["issues"]
    }
  },
  "user": {
    "assigned_issues": [
      {"id": 1001, "number": 12, "title": "Crash on [startup]",
       "url": "https://github.com/octo/hello/issues/12", "repository": "octo/hello",
       "created_at": "2024-03-01T09:00:00Z"},
      {"id": 1002, "number": 9, "title": "Docs typo",
       "url": "https://github.com/octo/hello/issues/9", "repository": "octo/hello",
       "state": "closed", "created_at": "2024-02-20T09:00:00Z",
       "closed_at": "2024-03-05T10:00:00Z"}
    ],
    "assigned_pull_requests": [
      {"id": 2001, "number": 14, "title": "Add parser",
       "url": "https://github.com/octo/hello/pull/14", "repository": "octo/hello",
       "created_at": "2024-03-04T00:00:00Z"}
    ],
    "review_requested_pull_requests": [
      {"id": 3001, "number": 2, "title": "Review me",
       "url": "https://github.com/octo/other/pull/2", "repository": "octo/other",
       "created_at": "2024-03-08T00:00:00Z"}
    ],
    "authored_pull_requests": [
      {"id": 2001, "number": 14, "title": "Add parser",
       "url": "https://github.com/octo/hello/pull/14", "repository": "octo/hello",
       "created_at": "2024-03-04T00:00:00Z"}
    ]
  }
}"#;

pub const HELLO_NOTE: &str = "---\ngithub-repo: octo/hello\ntags: [project]\n---\n# Hello\n\nMy notes.\n";

pub const BROKEN_NOTE: &str = "---\ngithub-repo: octo/broken\n---\n# Broken\n";

pub const TASKS_NOTE: &str = "# GitHub Tasks\n\nThings to do.\n";

pub const HELLO_ISSUE_LINE: &str = r"- [ ] [Crash on \[startup\]](https://github.com/octo/hello/issues/12) #github <!-- gh id=1001 kind=issue repo=octo/hello number=12 -->";

pub const HELLO_PR_LINE: &str = "- [ ] [Add parser](https://github.com/octo/hello/pull/14) #github <!-- gh id=2001 kind=pr repo=octo/hello number=14 -->";

pub const DOCS_TYPO_LINE: &str = "- [x] [Docs typo](https://github.com/octo/hello/issues/9) #github ✅ 2024-03-05 <!-- gh id=1002 kind=issue repo=octo/hello number=9 -->";

pub const HELLO_ACTIVITY: &str = "\
**Last 7 days:**

**Merged Pull Requests:**
- 🔀 [Speed up](https://github.com/octo/hello/pull/13) by @hubot

**Closed Issues:**
- ✅ [Docs typo](https://github.com/octo/hello/issues/9)

**Releases:**
- 🏷️ [v1.0](https://github.com/octo/hello/releases/tag/v1.0.0)

**Recent Commits:**
- 📝 [Speed up parser](https://github.com/octo/hello/commit/abc1234) by @hubot";
