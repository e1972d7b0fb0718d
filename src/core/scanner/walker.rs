//! Directory walking implementation using walkdir.

use super::filter::{is_hidden, ExtensionFilter, DEFAULT_EXTENSIONS};
use super::{CandidateFile, ScanResult};
use crate::core::quarantine::is_quarantine_folder;
use crate::error::{DedupeError, FileError};
use crate::events::{Event, EventSender, ScanEvent};
use std::path::Path;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Configuration for the directory scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Descend into subdirectories
    pub recursive: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Extensions to include
    pub extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            include_hidden: true,
            follow_symlinks: false,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Scanner implementation using the walkdir crate
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: ExtensionFilter,
}

impl WalkDirScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let filter = ExtensionFilter::new(&config.extensions).with_hidden(config.include_hidden);
        Self { config, filter }
    }

    pub fn filter(&self) -> &ExtensionFilter {
        &self.filter
    }

    /// Enumerate eligible files under `root`, sorted by full path.
    ///
    /// Failing to read `root` itself is fatal. Unreadable entries below it
    /// are recorded in the result and the walk continues.
    pub fn scan(&self, root: &Path, events: &EventSender) -> Result<ScanResult, DedupeError> {
        if !root.is_dir() {
            return Err(DedupeError::InvalidRoot {
                path: root.to_path_buf(),
            });
        }

        events.send(Event::Scan(ScanEvent::Started {
            root: root.to_path_buf(),
            recursive: self.config.recursive,
        }));

        let mut walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(self.config.follow_symlinks);
        if !self.config.recursive {
            walker = walker.max_depth(1);
        }

        let include_hidden = self.config.include_hidden;
        let entries = walker
            .into_iter()
            .filter_entry(|entry| !skip_directory(entry, include_hidden));

        let mut candidates = Vec::new();
        let mut errors = Vec::new();

        for entry_result in entries {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(DedupeError::Traversal {
                        path: root.to_path_buf(),
                        source: e.into(),
                    });
                }
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                    events.send(Event::Scan(ScanEvent::Error {
                        path: path.clone(),
                        message: e.to_string(),
                    }));
                    errors.push(FileError::Walk {
                        path,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                events.send(Event::Scan(ScanEvent::DirectoryEntered {
                    path: entry.path().to_path_buf(),
                    candidates_found: candidates.len(),
                }));
                continue;
            }

            if !entry.file_type().is_file() || !self.filter.matches(entry.path()) {
                continue;
            }

            match entry.metadata() {
                Ok(metadata) => {
                    if let Some(candidate) = CandidateFile::new(entry.into_path(), metadata.len()) {
                        candidates.push(candidate);
                    }
                }
                Err(e) => {
                    let path = entry.path().to_path_buf();
                    warn!(path = %path.display(), error = %e, "failed to stat file");
                    events.send(Event::Scan(ScanEvent::Error {
                        path: path.clone(),
                        message: e.to_string(),
                    }));
                    errors.push(FileError::Walk {
                        path,
                        message: e.to_string(),
                    });
                }
            }
        }

        // Raw enumeration order differs across platforms; the processing
        // order decides which copy stays canonical.
        candidates.sort_by(|a, b| a.path.cmp(&b.path));

        debug!(count = candidates.len(), "scan complete");
        events.send(Event::Scan(ScanEvent::Completed {
            total_candidates: candidates.len(),
        }));

        Ok(ScanResult { candidates, errors })
    }
}

fn skip_directory(entry: &DirEntry, include_hidden: bool) -> bool {
    if !entry.file_type().is_dir() || entry.depth() == 0 {
        return false;
    }
    if is_quarantine_folder(entry.path()) {
        return true;
    }
    !include_hidden && is_hidden(entry.path())
}
