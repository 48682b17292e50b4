//! Error taxonomy shared by every stage of the pipeline.
//!
//! Nothing here is retried or recovered locally: each variant fails the whole
//! prepare/publish/fetch call and is surfaced to the caller as-is.

use std::path::PathBuf;

use crate::contract::{BackendError, Direction};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store root could not be created.
    #[error("failed to provision store root {path}: {source}")]
    Provisioning {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The base directory could not be walked.
    #[error("failed to enumerate {path}: {reason}")]
    Enumeration { path: PathBuf, reason: String },

    /// The glob pattern does not compile.
    #[error("invalid file pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// A single copy or directory creation failed; the whole operation fails with it.
    #[error("{direction} failed for {path}: {source}")]
    Transfer {
        direction: Direction,
        path: String,
        #[source]
        source: BackendError,
    },

    #[error("configuration error: {0}")]
    Configuration(String),
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
