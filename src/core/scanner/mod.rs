//! # Scanner Module
//!
//! Discovers candidate files under a root directory.
//!
//! Candidates are filtered by a case-insensitive extension allow-list and
//! returned sorted by full path, which fixes the processing order for the
//! rest of the run. Quarantine folders from earlier runs are never entered.
//!
//! ## Example
//! ```rust,ignore
//! use media_deduper::core::scanner::{ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! let result = scanner.scan(Path::new("/media"), &null_sender())?;
//! ```

mod filter;
mod walker;

pub use filter::{normalize_extension, ExtensionFilter, DEFAULT_EXTENSIONS};
pub use walker::{ScanConfig, WalkDirScanner};

use crate::error::FileError;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::PathBuf;

/// A file selected for hashing during one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFile {
    /// Full path to the file
    pub path: PathBuf,
    /// Base name, including extension (lossy for display; `path` is exact)
    pub name: String,
    /// Extension, lower case, without the dot
    pub extension: String,
    /// File size in bytes at scan time
    pub size: u64,
}

impl CandidateFile {
    /// Build a candidate from a path. `None` if the path has no file name.
    pub fn new(path: PathBuf, size: u64) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().into_owned();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        Some(Self {
            path,
            name,
            extension,
            size,
        })
    }

    /// File name without its extension, bytes as on disk
    pub fn stem(&self) -> &OsStr {
        self.path.file_stem().unwrap_or_default()
    }

    /// Extension exactly as it appears on disk (case preserved)
    pub fn original_extension(&self) -> Option<&OsStr> {
        self.path.extension()
    }
}

/// Result of a scan
#[derive(Debug)]
pub struct ScanResult {
    /// Eligible files, sorted by path
    pub candidates: Vec<CandidateFile>,
    /// Entries that could not be read (non-fatal)
    pub errors: Vec<FileError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_splits_name_parts() {
        let candidate = CandidateFile::new(PathBuf::from("/media/Holiday.Trip.JPG"), 10).unwrap();

        assert_eq!(candidate.name, "Holiday.Trip.JPG");
        assert_eq!(candidate.stem(), "Holiday.Trip");
        assert_eq!(candidate.extension, "jpg");
        assert_eq!(candidate.original_extension(), Some(OsStr::new("JPG")));
    }

    #[test]
    fn candidate_without_extension() {
        let candidate = CandidateFile::new(PathBuf::from("/media/README"), 0).unwrap();

        assert_eq!(candidate.extension, "");
        assert_eq!(candidate.original_extension(), None);
        assert_eq!(candidate.stem(), "README");
    }

    #[cfg(unix)]
    #[test]
    fn candidate_keeps_non_utf8_name_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let path = PathBuf::from("/media").join(OsStr::from_bytes(b"b\xff.JPG"));
        let candidate = CandidateFile::new(path, 1).unwrap();

        assert_eq!(candidate.stem().as_bytes(), b"b\xff");
        assert_eq!(candidate.original_extension(), Some(OsStr::new("JPG")));
        assert_eq!(candidate.extension, "jpg");
        assert_eq!(candidate.name, "b\u{FFFD}.JPG");
    }

    #[test]
    fn candidate_requires_file_name() {
        assert!(CandidateFile::new(PathBuf::from("/"), 0).is_none());
    }
}
