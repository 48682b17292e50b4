//! # publisher: the publish/fetch façade
//!
//! Orchestrates enumerator and transfer engine for one run:
//!
//! - [`Publisher::publish`] enumerates `working_dirs.base`, uploads every match under
//!   `{key}/{basename(actual_dir)}/` and derives the report URL.
//! - [`Publisher::fetch`] lists what is stored under the same prefix and copies it into
//!   `working_dirs.expected_dir`.
//!
//! `init` captures an immutable [`PublishContext`]. Every call clones that snapshot when
//! it starts, so re-initialising never affects a call already in flight.
//!
//! # Report URL
//! The first transferred item (in enumeration order) whose relative path ends with
//! `index.html` becomes `{root}/{key}/{relative_path}`. With several index files the
//! winner depends on that order; enumeration sorts siblings by name, so it is stable.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::classify::MimeClassifier;
use crate::contract::{
    BackendError, ContentClassifier, Direction, FileItem, ObjectStore, PluginConfig, Progress,
    ResolvedConfig, StoreLayout, WorkingDirs,
};
use crate::enumerate;
use crate::error::{Result, StoreError};
use crate::progress::TracingProgress;
use crate::store::LocalStore;
use crate::transfer::{TransferEngine, TransferPlan};

const INDEX_FILE: &str = "index.html";

/// Everything the host hands over on `init`.
#[derive(Debug, Clone)]
pub struct PublisherOptions {
    pub working_dirs: WorkingDirs,
    pub config: PluginConfig,
    pub no_emit: bool,
}

/// Immutable snapshot a single publish/fetch runs against.
pub struct PublishContext {
    pub working_dirs: WorkingDirs,
    pub config: ResolvedConfig,
    pub no_emit: bool,
    pub layout: StoreLayout,
    store: Arc<dyn ObjectStore>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_url: Option<String>,
    pub items: Vec<FileItem>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FetchResult {
    pub items: Vec<FileItem>,
}

pub struct Publisher {
    classifier: Arc<dyn ContentClassifier>,
    progress: Arc<dyn Progress>,
    context: Option<Arc<PublishContext>>,
}

impl Default for Publisher {
    fn default() -> Self {
        Self::new(Arc::new(MimeClassifier), Arc::new(TracingProgress::new()))
    }
}

impl Publisher {
    pub fn new(classifier: Arc<dyn ContentClassifier>, progress: Arc<dyn Progress>) -> Self {
        Self {
            classifier,
            progress,
            context: None,
        }
    }

    /// Initialises against a [`LocalStore`] rooted at `config.root_path`. Replaces any prior config.
    pub fn init(&mut self, options: PublisherOptions) -> Result<()> {
        let store = Arc::new(LocalStore::new(options.config.root_path.clone()));
        self.init_with_store(options, store)
    }

    /// Initialises against any store backend. Replaces any prior config.
    pub fn init_with_store(&mut self, options: PublisherOptions, store: Arc<dyn ObjectStore>) -> Result<()> {
        let config = options.config.resolved()?;
        if config.root_path.as_os_str().is_empty() && !options.no_emit {
            return Err(StoreError::Configuration(
                "root_path is required unless no_emit is set".to_string(),
            ));
        }
        let layout = StoreLayout::new(options.working_dirs.actual_name(), config.layout);
        info!(
            root = %config.root_path.display(),
            base = %options.working_dirs.base.display(),
            layout = ?config.layout,
            no_emit = options.no_emit,
            "Publisher initialised"
        );
        self.context = Some(Arc::new(PublishContext {
            working_dirs: options.working_dirs,
            config,
            no_emit: options.no_emit,
            layout,
            store,
        }));
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.context.is_some()
    }

    fn context(&self) -> Result<Arc<PublishContext>> {
        self.context
            .clone()
            .ok_or_else(|| StoreError::Configuration("publisher used before init".to_string()))
    }

    fn engine(&self, context: &PublishContext) -> TransferEngine {
        TransferEngine::new(context.store.clone(), self.progress.clone())
            .with_concurrency(context.config.concurrency)
            .with_schedule(context.config.schedule)
    }

    /// Files under `working_dirs.base` that a publish would upload.
    pub async fn list_publishable(&self) -> Result<Vec<FileItem>> {
        let context = self.context()?;
        self.enumerate(&context).await
    }

    async fn enumerate(&self, context: &PublishContext) -> Result<Vec<FileItem>> {
        let base = context.working_dirs.base.clone();
        let pattern = context.config.pattern.clone();
        let classifier = self.classifier.clone();
        tokio::task::spawn_blocking(move || enumerate::list(&base, &pattern, classifier.as_ref()))
            .await
            .map_err(|e| StoreError::Enumeration {
                path: context.working_dirs.base.clone(),
                reason: e.to_string(),
            })?
    }

    pub async fn publish(&self, key: &str) -> Result<PublishResult> {
        let context = self.context()?;
        let list = self.enumerate(&context).await?;

        if !list.is_empty() {
            if context.no_emit {
                info!(count = list.len(), key, "There are files to publish");
            } else {
                info!(count = list.len(), key, root = %context.config.root_path.display(), "Uploading files");
            }
        }

        let prefix = context.layout.prefix(key);
        if !context.no_emit {
            context.store.ensure_prefix(&prefix).await.map_err(|source| {
                error!(error = %source, prefix = %prefix, "Failed to prepare key prefix");
                StoreError::Transfer {
                    direction: Direction::Publish,
                    path: context.store.locate(&prefix),
                    source,
                }
            })?;
        }

        let plan = TransferPlan {
            key,
            direction: Direction::Publish,
            layout: &context.layout,
            no_emit: context.no_emit,
        };
        let items = self.engine(&context).transfer(list, &plan).await?;

        let report_url = items
            .iter()
            .find(|item| item.relative_path.ends_with(INDEX_FILE))
            .map(|item| report_location(&context, key, &item.relative_path));
        info!(key, count = items.len(), report_url = ?report_url, "Publish complete");

        Ok(PublishResult { report_url, items })
    }

    pub async fn fetch(&self, key: &str) -> Result<FetchResult> {
        let context = self.context()?;
        if context.no_emit {
            info!(key, "Skip fetch because of no_emit");
            return Ok(FetchResult::default());
        }

        let prefix = context.layout.prefix(key);
        let fetch_error = |source: BackendError| StoreError::Transfer {
            direction: Direction::Fetch,
            path: context.store.locate(&prefix),
            source,
        };
        context.store.ensure_prefix(&prefix).await.map_err(fetch_error)?;
        let names = context.store.list(&prefix).await.map_err(|source| {
            error!(error = %source, prefix = %prefix, "Failed to list stored snapshot");
            fetch_error(source)
        })?;

        let expected_dir = &context.working_dirs.expected_dir;
        let list: Vec<FileItem> = names
            .into_iter()
            .map(|name| {
                let mime_type = self
                    .classifier
                    .classify(Path::new(&name))
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                FileItem {
                    absolute_path: expected_dir.join(&name),
                    relative_path: name,
                    mime_type,
                }
            })
            .collect();
        info!(key, count = list.len(), expected_dir = %expected_dir.display(), "Fetching stored snapshot");

        let plan = TransferPlan {
            key,
            direction: Direction::Fetch,
            layout: &context.layout,
            no_emit: false,
        };
        let items = self.engine(&context).transfer(list, &plan).await?;
        Ok(FetchResult { items })
    }
}

fn report_location(context: &PublishContext, key: &str, relative_path: &str) -> String {
    context
        .config
        .root_path
        .join(key)
        .join(relative_path)
        .display()
        .to_string()
}
