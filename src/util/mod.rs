//! Shared utilities for `ghtasks`.
//!
//! - Frontmatter extraction (`github-repo`, `github-sync`)
//! - Date parsing and formatting

pub mod frontmatter;
pub mod time;

pub use frontmatter::{Frontmatter, extract_frontmatter, extract_repo_config, repo_config_from_mapping};
