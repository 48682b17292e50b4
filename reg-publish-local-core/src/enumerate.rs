//! File enumerator: walks a base directory against a glob pattern.

use std::path::Path;

use globset::{GlobBuilder, GlobMatcher};
use tracing::{debug, error, info};
use walkdir::WalkDir;

use crate::contract::{ContentClassifier, FileItem};
use crate::error::{Result, StoreError};
use crate::store::to_slash;

/// Compiles a pattern so that `*` stays within one segment and `**/` spans zero or more.
pub fn compile_pattern(pattern: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|source| StoreError::Pattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// Lists files under `base_dir` whose relative path matches `pattern`.
///
/// Dotfiles and anything below a dot-directory are skipped. Entries the classifier
/// cannot type are dropped. Order is the walk order with
/// siblings sorted by name, so it is the same on every filesystem.
pub fn list(
    base_dir: &Path,
    pattern: &str,
    classifier: &dyn ContentClassifier,
) -> Result<Vec<FileItem>> {
    let matcher = compile_pattern(pattern)?;
    let base = std::path::absolute(base_dir).map_err(|e| StoreError::Enumeration {
        path: base_dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut items = Vec::new();
    let walker = WalkDir::new(&base)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));
    for entry in walker {
        let entry = entry.map_err(|e| {
            error!(error = %e, base = %base.display(), "Failed to walk base directory");
            StoreError::Enumeration {
                path: e.path().unwrap_or(&base).to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(&base) else {
            continue;
        };
        let relative_path = to_slash(relative);
        if !matcher.is_match(&relative_path) {
            continue;
        }
        match classifier.classify(entry.path()) {
            Some(mime_type) => items.push(FileItem {
                relative_path,
                absolute_path: entry.path().to_path_buf(),
                mime_type,
            }),
            None => debug!(path = %relative_path, "Skipping file without a content type"),
        }
    }

    info!(base = %base.display(), pattern, count = items.len(), "Enumerated files");
    Ok(items)
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}
