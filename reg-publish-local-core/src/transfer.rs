//! Transfer engine: copies a list of files to or from the store with bounded concurrency.
//!
//! Two schedules are supported (see [`Schedule`]). Both keep output order equal to
//! input order, never run more than `concurrency` copies at once, and fail the whole
//! call on the first failed copy. Writes that already completed are not rolled back.

use std::sync::Arc;

use futures::future::try_join_all;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, error, info};

use crate::contract::{
    Direction, FileItem, ObjectStore, Progress, Schedule, StoreLayout, CONCURRENCY_SIZE,
};
use crate::error::{Result, StoreError};

/// Per-call parameters of a transfer.
#[derive(Debug, Clone)]
pub struct TransferPlan<'a> {
    pub key: &'a str,
    pub direction: Direction,
    pub layout: &'a StoreLayout,
    /// Return the items untouched without any store call.
    pub no_emit: bool,
}

pub struct TransferEngine {
    store: Arc<dyn ObjectStore>,
    progress: Arc<dyn Progress>,
    concurrency: usize,
    schedule: Schedule,
}

impl TransferEngine {
    pub fn new(store: Arc<dyn ObjectStore>, progress: Arc<dyn Progress>) -> Self {
        Self {
            store,
            progress,
            concurrency: CONCURRENCY_SIZE,
            schedule: Schedule::default(),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Transfers every item.
    ///
    /// For [`Direction::Publish`] each item's `absolute_path` is the source file; for
    /// [`Direction::Fetch`] it is the destination file and `relative_path` is a name
    /// listed under the key prefix.
    pub async fn transfer(&self, items: Vec<FileItem>, plan: &TransferPlan<'_>) -> Result<Vec<FileItem>> {
        if plan.no_emit {
            info!(count = items.len(), direction = %plan.direction, "Dry run, skipping transfer");
            if !items.is_empty() {
                self.progress.start(items.len());
                self.progress.stop();
            }
            return Ok(items);
        }
        if items.is_empty() {
            return Ok(items);
        }

        self.progress.start(items.len());
        let result = match self.schedule {
            Schedule::Pooled => self.run_pooled(items, plan).await,
            Schedule::Batched => self.run_batched(items, plan).await,
        };
        self.progress.stop();
        result
    }

    async fn run_pooled(&self, items: Vec<FileItem>, plan: &TransferPlan<'_>) -> Result<Vec<FileItem>> {
        stream::iter(items)
            .map(|item| self.transfer_one(item, plan))
            .buffered(self.concurrency)
            .try_collect()
            .await
    }

    async fn run_batched(&self, items: Vec<FileItem>, plan: &TransferPlan<'_>) -> Result<Vec<FileItem>> {
        let total_batches = items.len().div_ceil(self.concurrency);
        let mut done = Vec::with_capacity(items.len());
        let mut pending = items.into_iter().peekable();
        let mut batch_index = 0;

        while pending.peek().is_some() {
            let batch: Vec<FileItem> = pending.by_ref().take(self.concurrency).collect();
            debug!(batch = batch_index, total_batches, size = batch.len(), "Starting batch");
            let transferred =
                try_join_all(batch.into_iter().map(|item| self.transfer_one(item, plan))).await?;
            done.extend(transferred);
            batch_index += 1;
        }
        Ok(done)
    }

    async fn transfer_one(&self, item: FileItem, plan: &TransferPlan<'_>) -> Result<FileItem> {
        // Fetched names come from a listing and are already object names under the prefix.
        let object_key = match plan.direction {
            Direction::Publish => plan.layout.object_key(plan.key, &item.relative_path),
            Direction::Fetch => plan.layout.listed_key(plan.key, &item.relative_path),
        };
        let outcome = match plan.direction {
            Direction::Publish => self.store.put_file(&item.absolute_path, &object_key).await,
            Direction::Fetch => self.store.get_file(&object_key, &item.absolute_path).await,
        };

        match outcome {
            Ok(()) => {
                self.progress.increment(1);
                Ok(item)
            }
            Err(source) => {
                let path = match plan.direction {
                    Direction::Publish => item.absolute_path.display().to_string(),
                    Direction::Fetch => object_key,
                };
                error!(error = %source, direction = %plan.direction, path = %path, "Transfer failed");
                Err(StoreError::Transfer {
                    direction: plan.direction,
                    path,
                    source,
                })
            }
        }
    }
}
