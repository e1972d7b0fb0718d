//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by a dedupe run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Scanning phase events
    Scan(ScanEvent),
    /// Hashing phase events
    Hash(HashEvent),
    /// Quarantine events (folder creation and relocations)
    Quarantine(QuarantineEvent),
    /// Run-level events
    Pipeline(PipelineEvent),
}

/// Events during the scanning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { root: PathBuf, recursive: bool },
    /// A directory was entered
    DirectoryEntered { path: PathBuf, candidates_found: usize },
    /// An entry could not be read but scanning continues
    Error { path: PathBuf, message: String },
    /// Scanning completed
    Completed { total_candidates: usize },
}

/// Events during the hashing phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HashEvent {
    /// Hashing has started
    Started { total_files: usize },
    /// Progress update during hashing
    Progress(HashProgress),
    /// A file could not be read
    Error { path: PathBuf, message: String },
    /// Hashing completed
    Completed { total_hashed: usize },
}

/// Progress information during hashing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashProgress {
    /// Number of files hashed so far
    pub completed: usize,
    /// Total number of files to hash
    pub total: usize,
    /// File that was just hashed
    pub current_path: PathBuf,
}

/// Events from the quarantine mover
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum QuarantineEvent {
    /// The quarantine folder exists and is ready
    FolderReady { path: PathBuf },
    /// A duplicate was moved into quarantine
    Relocated {
        from: PathBuf,
        to: PathBuf,
        canonical: PathBuf,
    },
    /// A duplicate could not be moved
    Error { path: PathBuf, message: String },
}

/// Run-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Run has started
    Started { root: PathBuf },
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Run completed
    Completed { summary: PipelineSummary },
    /// Run failed with a fatal error
    Error { message: String },
}

/// Phases of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Hashing,
    Deciding,
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Files that passed the extension filter
    pub files_scanned: usize,
    /// Distinct contents found
    pub distinct_files: usize,
    /// Duplicates moved into quarantine
    pub duplicates_relocated: usize,
    /// Per-file errors recorded
    pub errors: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Hashing => write!(f, "Hashing"),
            PipelinePhase::Deciding => write!(f, "Deciding"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Quarantine(QuarantineEvent::Relocated {
            from: PathBuf::from("/media/b.jpg"),
            to: PathBuf::from("/media/DeDupedFiles.01-02-2024/b_1.jpg"),
            canonical: PathBuf::from("/media/a.jpg"),
        });

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Quarantine(QuarantineEvent::Relocated { to, .. }) => {
                assert!(to.ends_with("b_1.jpg"));
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn pipeline_summary_is_serializable() {
        let summary = PipelineSummary {
            files_scanned: 1000,
            distinct_files: 850,
            duplicates_relocated: 150,
            errors: 2,
            duration_ms: 5000,
        };

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"duplicates_relocated\":150"));
    }

    #[test]
    fn phase_displays_name() {
        assert_eq!(PipelinePhase::Deciding.to_string(), "Deciding");
    }
}
