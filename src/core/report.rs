//! Summary of a completed run.

use crate::core::hasher::DigestAlgorithm;
use crate::error::{ErrorKind, FileError};
use crate::events::PipelineSummary;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use uuid::Uuid;

/// One duplicate moved into quarantine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relocation {
    /// Original location of the duplicate
    pub from: PathBuf,
    /// Location inside the quarantine folder
    pub to: PathBuf,
    /// Canonical file it duplicates
    pub canonical: PathBuf,
    /// Shared content identity, hex
    pub identity: String,
    /// Per-identity sequence number used in the name
    pub sequence: u32,
}

/// A per-file error, flattened for output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedError {
    pub path: PathBuf,
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&FileError> for ReportedError {
    fn from(error: &FileError) -> Self {
        Self {
            path: error.path().clone(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Final result of a run. Read-only once returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    /// Root directory that was scanned
    pub root: PathBuf,
    pub algorithm: DigestAlgorithm,
    /// Date used to name the quarantine folder
    pub run_date: NaiveDate,
    /// Quarantine folder, if this run created or used one
    pub quarantine_dir: Option<PathBuf>,
    /// Content identity (hex) → canonical path
    pub canonical: BTreeMap<String, PathBuf>,
    pub relocations: Vec<Relocation>,
    /// Files that passed the extension filter
    pub files_scanned: usize,
    pub duplicates_relocated: usize,
    pub errors: Vec<ReportedError>,
    pub duration_ms: u64,
}

impl RunReport {
    pub(crate) fn new(root: PathBuf, algorithm: DigestAlgorithm, run_date: NaiveDate) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            root,
            algorithm,
            run_date,
            quarantine_dir: None,
            canonical: BTreeMap::new(),
            relocations: Vec::new(),
            files_scanned: 0,
            duplicates_relocated: 0,
            errors: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Number of distinct contents seen
    pub fn distinct_files(&self) -> usize {
        self.canonical.len()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// True when no per-file errors were recorded
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            files_scanned: self.files_scanned,
            distinct_files: self.distinct_files(),
            duplicates_relocated: self.duplicates_relocated,
            errors: self.error_count(),
            duration_ms: self.duration_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReadError;
    use std::io;

    fn report() -> RunReport {
        RunReport::new(
            PathBuf::from("/media"),
            DigestAlgorithm::Sha1,
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        )
    }

    #[test]
    fn new_report_is_clean() {
        let report = report();
        assert!(report.is_clean());
        assert_eq!(report.distinct_files(), 0);
        assert!(report.quarantine_dir.is_none());
    }

    #[test]
    fn reported_error_keeps_path_and_kind() {
        let error = FileError::Read(ReadError {
            path: PathBuf::from("/media/locked.jpg"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        });

        let reported = ReportedError::from(&error);

        assert_eq!(reported.path, PathBuf::from("/media/locked.jpg"));
        assert_eq!(reported.kind, ErrorKind::Read);
        assert!(reported.message.contains("denied"));
    }

    #[test]
    fn report_serializes_to_json() {
        let mut report = report();
        report
            .canonical
            .insert("ab".repeat(20), PathBuf::from("/media/a.jpg"));
        report.files_scanned = 2;
        report.duplicates_relocated = 1;

        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["files_scanned"], 2);
        assert_eq!(json["algorithm"], "sha1");
        assert_eq!(json["run_date"], "2024-02-01");
        assert_eq!(json["canonical"]["ab".repeat(20)], "/media/a.jpg");
    }

    #[test]
    fn summary_mirrors_counts() {
        let mut report = report();
        report.files_scanned = 5;
        report.duplicates_relocated = 2;

        let summary = report.summary();
        assert_eq!(summary.files_scanned, 5);
        assert_eq!(summary.duplicates_relocated, 2);
        assert_eq!(summary.errors, 0);
    }
}
