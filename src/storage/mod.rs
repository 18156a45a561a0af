//! Document store collaborator.
//!
//! Documents are addressed by vault-relative paths with `/` separators
//! (`Projects/hello.md`). [`FsVault`] maps them onto a directory,
//! [`MemoryStore`] keeps them in memory.

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::model::RepoConfig;
use crate::util::frontmatter::{Frontmatter, extract_frontmatter, repo_config_from_mapping};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Key/value access to markdown documents.
pub trait DocumentStore {
    /// Paths of all markdown documents, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be enumerated.
    fn list(&self) -> Result<Vec<String>>;

    /// Full text of a document.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::DocumentNotFound`] for unknown paths.
    fn read(&self, path: &str) -> Result<String>;

    /// Replace the full text of a document, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    fn write(&mut self, path: &str, text: &str) -> Result<()>;

    fn exists(&self, path: &str) -> bool;

    /// Parsed frontmatter of a document.
    ///
    /// Stores with a metadata cache can answer this without reading the body.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read.
    fn frontmatter(&self, path: &str) -> Result<Option<Frontmatter>> {
        Ok(extract_frontmatter(&self.read(path)?))
    }
}

/// Reject absolute paths and `..` components.
///
/// # Errors
///
/// Returns a validation error naming the offending path.
pub fn validate_document_path(path: &str) -> Result<()> {
    let candidate = Path::new(path);
    let escapes = candidate.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if path.is_empty() || escapes {
        return Err(SyncError::validation(
            "path",
            format!("'{path}' must be a relative path inside the vault"),
        ));
    }
    Ok(())
}

/// A vault on the local file system.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    /// Open an existing vault directory.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::VaultNotFound`] if `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(SyncError::VaultNotFound { path: root });
        }
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        validate_document_path(path)?;
        Ok(self.root.join(path))
    }
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

impl DocumentStore for FsVault {
    fn list(&self) -> Result<Vec<String>> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|e| !is_hidden(e))
        {
            let entry = entry.map_err(|e| SyncError::Io(e.into()))?;
            if !entry.file_type().is_file()
                || entry.path().extension().is_none_or(|ext| ext != "md")
            {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let joined = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            paths.push(joined);
        }
        paths.sort();
        Ok(paths)
    }

    fn read(&self, path: &str) -> Result<String> {
        let full = self.resolve(path)?;
        if !full.is_file() {
            return Err(SyncError::DocumentNotFound { path: full });
        }
        Ok(fs::read_to_string(full)?)
    }

    fn write(&mut self, path: &str, text: &str) -> Result<()> {
        let full = self.resolve(path)?;
        let parent = full.parent().ok_or_else(|| {
            SyncError::Config(format!("Invalid document path: {}", full.display()))
        })?;
        fs::create_dir_all(parent)?;

        let temp_path = full.with_extension("md.tmp");
        fs::write(&temp_path, text)?;
        fs::rename(&temp_path, &full)?;
        debug!(path, bytes = text.len(), "Wrote document");
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok_and(|full| full.is_file())
    }
}

/// In-memory store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    documents: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, path: &str, text: &str) -> Self {
        self.documents.insert(path.to_string(), text.to_string());
        self
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.documents.get(path).map(String::as_str)
    }
}

impl DocumentStore for MemoryStore {
    fn list(&self) -> Result<Vec<String>> {
        Ok(self
            .documents
            .keys()
            .filter(|p| p.ends_with(".md"))
            .cloned()
            .collect())
    }

    fn read(&self, path: &str) -> Result<String> {
        self.documents
            .get(path)
            .cloned()
            .ok_or_else(|| SyncError::DocumentNotFound {
                path: PathBuf::from(path),
            })
    }

    fn write(&mut self, path: &str, text: &str) -> Result<()> {
        validate_document_path(path)?;
        self.documents.insert(path.to_string(), text.to_string());
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.documents.contains_key(path)
    }
}

/// A document that opted into per-repository sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoNote {
    pub path: String,
    #[serde(flatten)]
    pub config: RepoConfig,
}

/// Whether `path` lies under one of `folders` (empty means everywhere).
fn in_scan_folders(path: &str, folders: &[String]) -> bool {
    folders.is_empty()
        || folders.iter().any(|folder| {
            path.strip_prefix(folder.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
        })
}

fn is_archived(path: &str) -> bool {
    path.split('/').any(|part| {
        part.eq_ignore_ascii_case("archive") || part.eq_ignore_ascii_case("archives")
    })
}

/// Find documents whose frontmatter names a repository and leaves sync on.
///
/// Documents whose metadata cannot be read are skipped with a warning.
///
/// # Errors
///
/// Returns an error only if the store cannot be enumerated.
pub fn scan_repo_notes(store: &dyn DocumentStore, config: &SyncConfig) -> Result<Vec<RepoNote>> {
    let mut notes = Vec::new();
    for path in store.list()? {
        if !in_scan_folders(&path, &config.scan_folders) {
            continue;
        }
        if config.exclude_archived && is_archived(&path) {
            debug!(path, "Skipping archived note");
            continue;
        }
        let frontmatter = match store.frontmatter(&path) {
            Ok(Some(frontmatter)) => frontmatter,
            Ok(None) => continue,
            Err(err) => {
                warn!(path, error = %err, "Could not read note metadata");
                continue;
            }
        };
        let Some(repo_config) = repo_config_from_mapping(&frontmatter) else {
            continue;
        };
        if !repo_config.sync_enabled {
            debug!(path, "Sync disabled in frontmatter");
            continue;
        }
        notes.push(RepoNote {
            path,
            config: repo_config,
        });
    }
    Ok(notes)
}
