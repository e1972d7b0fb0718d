//! Extension allow-list for the scanner.

use std::collections::HashSet;
use std::path::Path;

/// Extensions checked when the caller does not configure any
pub const DEFAULT_EXTENSIONS: &[&str] = &["gif", "jpg", "jpeg", "img", "png", "avi", "mp4", "mov"];

/// Normalize a configured extension: trim, drop one leading dot, lower-case.
pub fn normalize_extension(ext: &str) -> String {
    let trimmed = ext.trim();
    trimmed
        .strip_prefix('.')
        .unwrap_or(trimmed)
        .to_lowercase()
}

/// Decides whether a file is eligible for hashing based on its extension
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    /// Normalized extensions, lower case, no leading dot
    extensions: HashSet<String>,
    /// Whether to include hidden files
    include_hidden: bool,
}

impl ExtensionFilter {
    /// Create a filter from any list of extensions.
    ///
    /// Entries may be given as `jpg`, `.jpg` or `JPG`; empty entries are ignored.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| normalize_extension(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect(),
            include_hidden: true,
        }
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Check if a file should be hashed
    pub fn matches(&self, path: &Path) -> bool {
        if !self.include_hidden && is_hidden(path) {
            return false;
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.extensions.contains(&ext.to_lowercase()),
            None => false,
        }
    }

    /// Whether the allow-list is empty (nothing can match)
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Configured extensions in sorted order
    pub fn extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.extensions.iter().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

pub(crate) fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}
