//! Bucket preparer: provisions (or reuses) the root directory of the artifact store.

use std::path::PathBuf;

use tracing::{error, info};
use uuid::Uuid;

use crate::contract::BUCKET_PREFIX;
use crate::error::{Result, StoreError};

/// Options for a single prepare run.
#[derive(Debug, Clone, Default)]
pub struct PrepareOptions {
    /// Directory under which a new uniquely-named root is created.
    pub base_path: Option<PathBuf>,
    /// `false` reuses `existing_root` instead of generating a new one.
    pub create_root: bool,
    pub existing_root: Option<PathBuf>,
    /// Compute the identifier without touching the filesystem.
    pub no_emit: bool,
}

impl PrepareOptions {
    pub fn create_under(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: Some(base_path.into()),
            create_root: true,
            ..Self::default()
        }
    }

    pub fn reuse(existing_root: impl Into<PathBuf>) -> Self {
        Self {
            existing_root: Some(existing_root.into()),
            ..Self::default()
        }
    }

    pub fn no_emit(mut self, no_emit: bool) -> Self {
        self.no_emit = no_emit;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRoot {
    pub root_path: PathBuf,
}

/// Resolves the store root and, unless `no_emit` is set, creates it.
///
/// Every call with `create_root` yields a fresh `{BUCKET_PREFIX}-{uuid}` directory.
pub async fn prepare(options: &PrepareOptions) -> Result<PreparedRoot> {
    let root_path = if options.create_root {
        let base = options.base_path.as_ref().ok_or_else(|| {
            StoreError::Configuration("base path is required to create a store root".to_string())
        })?;
        base.join(format!("{}-{}", BUCKET_PREFIX, Uuid::new_v4()))
    } else {
        options.existing_root.clone().ok_or_else(|| {
            StoreError::Configuration("existing root is required when not creating one".to_string())
        })?
    };

    if options.no_emit {
        info!(root = %root_path.display(), "Skip creating store root because of no_emit");
        return Ok(PreparedRoot { root_path });
    }

    info!(root = %root_path.display(), "Creating store root");
    match tokio::fs::create_dir_all(&root_path).await {
        Ok(()) => {
            info!(root = %root_path.display(), "Store root ready");
            Ok(PreparedRoot { root_path })
        }
        Err(e) => {
            error!(error = ?e, root = %root_path.display(), "Failed to create store root");
            Err(StoreError::Provisioning {
                path: root_path,
                source: e,
            })
        }
    }
}
