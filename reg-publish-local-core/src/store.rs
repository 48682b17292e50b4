use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use walkdir::WalkDir;

use crate::contract::{BackendError, ObjectStore};

/// Filesystem-backed object store.
///
/// Each object is stored at `{root}/{key}`. Parent directories are created automatically.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_to_path(&self, key: &str) -> PathBuf {
        key.split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }
}

async fn ensure_parent(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    Ok(())
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn ensure_prefix(&self, prefix: &str) -> Result<(), BackendError> {
        fs::create_dir_all(self.key_to_path(prefix)).await?;
        Ok(())
    }

    async fn put_file(&self, source: &Path, key: &str) -> Result<(), BackendError> {
        let destination = self.key_to_path(key);
        ensure_parent(&destination).await?;
        fs::copy(source, &destination).await?;
        tracing::trace!(source = %source.display(), destination = %destination.display(), "Stored object");
        Ok(())
    }

    async fn get_file(&self, key: &str, destination: &Path) -> Result<(), BackendError> {
        let source = self.key_to_path(key);
        ensure_parent(destination).await?;
        fs::copy(&source, destination).await?;
        tracing::trace!(source = %source.display(), destination = %destination.display(), "Fetched object");
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, BackendError> {
        let dir = self.key_to_path(prefix);
        if !fs::try_exists(&dir).await? {
            return Ok(Vec::new());
        }
        let names = tokio::task::spawn_blocking(move || -> Result<Vec<String>, BackendError> {
            let mut names = Vec::new();
            for entry in WalkDir::new(&dir).min_depth(1).sort_by_file_name() {
                let entry = entry?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let relative = entry.path().strip_prefix(&dir)?;
                names.push(to_slash(relative));
            }
            Ok(names)
        })
        .await??;
        Ok(names)
    }

    fn locate(&self, key: &str) -> String {
        self.key_to_path(key).display().to_string()
    }
}

/// Renders a relative path with `/` separators regardless of platform.
pub(crate) fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
