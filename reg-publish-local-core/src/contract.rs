//! # contract: data models and injected seams
//!
//! This module defines the plain data passed between the preparer, enumerator,
//! transfer engine and publisher, plus the three capabilities the host injects:
//!
//! - [`ObjectStore`]: key-prefixed blob storage (local directory, bucket, mock).
//! - [`ContentClassifier`]: optional content-type lookup for a path.
//! - [`Progress`]: determinate progress reporting; presentation only.
//!
//! ## Mocking & Testing
//! - `ObjectStore` is annotated for `mockall` so tests can script failures per key.
//!
//! ## Store layout
//! Every object written for a key lives under `{key}/{basename(actual_dir)}/`.
//! [`StoreLayout`] is the single place that rule is encoded.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};

/// Name the plugin registers under in the host pipeline.
pub const PLUGIN_NAME: &str = "reg-publish-local-plugin";

/// Prefix of every directory created by the preparer.
pub const BUCKET_PREFIX: &str = "reg-publish-local";

/// Default enumeration pattern: common web, image and document extensions.
pub const DEFAULT_PATTERN: &str = "**/*.{html,js,wasm,png,json,jpeg,jpg,tiff,bmp,gif}";

/// Ceiling on simultaneous in-flight copies.
pub const CONCURRENCY_SIZE: usize = 50;

/// Error type of store backends (simple boxed error, as backends vary widely).
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// The four directories describing where the current run's artifacts live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingDirs {
    /// Root enumerated for publish.
    pub base: PathBuf,
    pub actual_dir: PathBuf,
    /// Destination of fetched snapshots.
    pub expected_dir: PathBuf,
    #[serde(default)]
    pub diff_dir: PathBuf,
}

impl WorkingDirs {
    /// Basename of `actual_dir`, used as the subtree name under each key.
    pub fn actual_name(&self) -> String {
        self.actual_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// How object names are derived from a file's relative path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Only the basename is kept. Same-named files in different directories overwrite each other.
    #[default]
    Flat,
    /// The full relative path is kept under the key.
    Nested,
}

/// How the transfer engine bounds concurrency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schedule {
    /// A bounded window over the whole list; a straggler never holds back the next item.
    #[default]
    Pooled,
    /// Fixed-size chunks, each fully joined before the next one starts.
    Batched,
}

/// Publisher configuration as supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfig {
    pub root_path: PathBuf,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default)]
    pub concurrency: Option<usize>,
}

/// [`PluginConfig`] with every default filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub root_path: PathBuf,
    pub pattern: String,
    pub layout: Layout,
    pub schedule: Schedule,
    pub concurrency: usize,
}

impl PluginConfig {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            ..Self::default()
        }
    }

    pub fn resolved(&self) -> Result<ResolvedConfig, crate::StoreError> {
        let concurrency = self.concurrency.unwrap_or(CONCURRENCY_SIZE);
        if concurrency == 0 {
            return Err(crate::StoreError::Configuration(
                "concurrency must be at least 1".to_string(),
            ));
        }
        Ok(ResolvedConfig {
            root_path: self.root_path.clone(),
            pattern: self
                .pattern
                .clone()
                .unwrap_or_else(|| DEFAULT_PATTERN.to_string()),
            layout: self.layout,
            schedule: self.schedule,
            concurrency,
        })
    }
}

/// One discovered or transferred file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileItem {
    /// Relative to the enumeration root (publish) or the key prefix (fetch), `/`-separated.
    pub relative_path: String,
    /// Source file for publish, destination file for fetch.
    pub absolute_path: PathBuf,
    pub mime_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Publish,
    Fetch,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Publish => f.write_str("publish"),
            Direction::Fetch => f.write_str("fetch"),
        }
    }
}

/// Derives object keys for one run: `{key}/{actual_name}/{name}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    pub actual_name: String,
    pub layout: Layout,
}

impl StoreLayout {
    pub fn new(actual_name: impl Into<String>, layout: Layout) -> Self {
        Self {
            actual_name: actual_name.into(),
            layout,
        }
    }

    pub fn prefix(&self, key: &str) -> String {
        format!("{}/{}", key, self.actual_name)
    }

    /// Object name of a file under the prefix.
    pub fn object_name<'a>(&self, relative_path: &'a str) -> &'a str {
        match self.layout {
            Layout::Flat => relative_path.rsplit('/').next().unwrap_or(relative_path),
            Layout::Nested => relative_path.trim_start_matches('/'),
        }
    }

    pub fn object_key(&self, key: &str, relative_path: &str) -> String {
        format!("{}/{}", self.prefix(key), self.object_name(relative_path))
    }

    /// Key of an object name as returned by [`ObjectStore::list`] under [`Self::prefix`].
    pub fn listed_key(&self, key: &str, listed_name: &str) -> String {
        format!("{}/{}", self.prefix(key), listed_name.trim_start_matches('/'))
    }
}

/// Key-prefixed blob storage.
///
/// Keys are `/`-separated object names relative to the store root. A remote backend
/// maps `put_file`/`get_file`/`list` to PUT/GET/LIST while keeping the same key layout.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Make sure a prefix can be written and listed. Idempotent.
    async fn ensure_prefix(&self, prefix: &str) -> Result<(), BackendError>;

    /// Copy a local file to `key`, creating intermediate prefixes.
    async fn put_file(&self, source: &Path, key: &str) -> Result<(), BackendError>;

    /// Copy the object at `key` to a local file, creating parent directories.
    async fn get_file(&self, key: &str, destination: &Path) -> Result<(), BackendError>;

    /// Object names below `prefix`, relative to it, sorted.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, BackendError>;

    /// Public location of an object key (path or URL).
    fn locate(&self, key: &str) -> String;
}

/// Content-type lookup. `None` means the path cannot be classified.
pub trait ContentClassifier: Send + Sync {
    fn classify(&self, path: &Path) -> Option<String>;
}

/// Determinate progress reporting. No logic may branch on it.
pub trait Progress: Send + Sync {
    fn start(&self, total: usize);
    fn increment(&self, n: usize);
    fn stop(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_layout_keeps_only_basename() {
        let layout = StoreLayout::new("dir_a", Layout::Flat);
        assert_eq!(layout.object_key("abc", "nested/deep/sample.png"), "abc/dir_a/sample.png");
        assert_eq!(layout.object_key("abc", "index.html"), "abc/dir_a/index.html");
    }

    #[test]
    fn nested_layout_keeps_relative_path() {
        let layout = StoreLayout::new("dir_a", Layout::Nested);
        assert_eq!(
            layout.object_key("abc", "nested/deep/sample.png"),
            "abc/dir_a/nested/deep/sample.png"
        );
    }

    #[test]
    fn listed_key_is_not_flattened_again() {
        let layout = StoreLayout::new("dir_a", Layout::Flat);
        assert_eq!(layout.listed_key("abc", "sub/inner.png"), "abc/dir_a/sub/inner.png");
    }

    #[test]
    fn resolved_config_fills_defaults_and_rejects_zero_concurrency() {
        let resolved = PluginConfig::new("/tmp/store").resolved().unwrap();
        assert_eq!(resolved.pattern, DEFAULT_PATTERN);
        assert_eq!(resolved.concurrency, CONCURRENCY_SIZE);
        assert_eq!(resolved.layout, Layout::Flat);

        let mut config = PluginConfig::new("/tmp/store");
        config.concurrency = Some(0);
        assert!(config.resolved().is_err());
    }
}
