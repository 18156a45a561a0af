//! `ghtasks` - reconcile GitHub issues and pull requests into markdown notes.
//!
//! The crate is split into a pure reconciliation core and the collaborators
//! around it:
//!
//! - [`format`] - the line codec (parse/render task lines in two dialects)
//! - [`sync`] - managed-section editing, reconciliation, and orchestration
//! - [`util::frontmatter`] - per-document repository configuration
//! - [`source`] / [`storage`] - remote items and document storage
//! - [`config`], [`error`], [`logging`], [`cli`] - ambient plumbing

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod model;
pub mod source;
pub mod storage;
pub mod sync;
pub mod util;

pub use error::{ErrorCode, Result, StructuredError, SyncError};
