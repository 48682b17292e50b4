use std::path::Path;

use crate::contract::ContentClassifier;

/// Extension-based classification backed by `mime_guess`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MimeClassifier;

impl ContentClassifier for MimeClassifier {
    fn classify(&self, path: &Path) -> Option<String> {
        mime_guess::from_path(path).first_raw().map(str::to_string)
    }
}
