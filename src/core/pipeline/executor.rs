//! Pipeline execution implementation.

use crate::core::hasher::{ContentHasher, ContentIdentity, DigestAlgorithm};
use crate::core::index::{Classification, DuplicateIndex};
use crate::core::quarantine::{QuarantineCreation, QuarantineMover};
use crate::core::report::{Relocation, ReportedError, RunReport};
use crate::core::scanner::{CandidateFile, ScanConfig, WalkDirScanner};
use crate::error::{DedupeError, FileError, ReadError};
use crate::events::{
    null_sender, Event, EventSender, HashEvent, HashProgress, PipelineEvent, PipelinePhase,
    QuarantineEvent,
};
use chrono::{Local, NaiveDate};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// How file contents are hashed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashingMode {
    /// Hash, decide and relocate one file at a time
    Sequential,
    /// Hash all candidates on the rayon pool, then decide in traversal order
    #[default]
    Parallel,
}

/// What a per-file error does to the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Record the error and move on to the next file
    #[default]
    Continue,
    /// Fail the run on the first per-file error
    Abort,
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory to deduplicate
    pub root: PathBuf,
    /// Digest used for content identities
    pub algorithm: DigestAlgorithm,
    pub hashing: HashingMode,
    pub quarantine: QuarantineCreation,
    pub error_policy: ErrorPolicy,
    /// Scanner configuration
    pub scan_config: ScanConfig,
    /// Date for the quarantine folder name (None = today, local time)
    pub date: Option<NaiveDate>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            algorithm: DigestAlgorithm::default(),
            hashing: HashingMode::default(),
            quarantine: QuarantineCreation::default(),
            error_policy: ErrorPolicy::default(),
            scan_config: ScanConfig::default(),
            date: None,
        }
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// Set the directory to deduplicate
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.root = root.into();
        self
    }

    /// Descend into subdirectories (default true)
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.config.scan_config.recursive = recursive;
        self
    }

    /// Replace the extension allow-list
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.scan_config.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the digest algorithm
    pub fn algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.config.algorithm = algorithm;
        self
    }

    pub fn hashing(mut self, hashing: HashingMode) -> Self {
        self.config.hashing = hashing;
        self
    }

    /// Choose when the quarantine folder is created
    pub fn quarantine(mut self, creation: QuarantineCreation) -> Self {
        self.config.quarantine = creation;
        self
    }

    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.config.error_policy = policy;
        self
    }

    /// Include hidden files
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.scan_config.include_hidden = include;
        self
    }

    /// Fix the run date instead of using today
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.config.date = Some(date);
        self
    }

    /// Set scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan_config = config;
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutable state for one run. Only the deciding thread touches it.
struct RunState {
    index: DuplicateIndex,
    mover: QuarantineMover,
    report: RunReport,
}

/// The dedupe pipeline: scan, hash, decide, relocate
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<RunReport, DedupeError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(&self, events: &EventSender) -> Result<RunReport, DedupeError> {
        let result = self.execute(events);
        match &result {
            Ok(report) => {
                events.send(Event::Pipeline(PipelineEvent::Completed {
                    summary: report.summary(),
                }));
            }
            Err(e) => {
                warn!(error = %e, "run failed");
                events.send(Event::Pipeline(PipelineEvent::Error {
                    message: e.to_string(),
                }));
            }
        }
        result
    }

    fn execute(&self, events: &EventSender) -> Result<RunReport, DedupeError> {
        let start_time = Instant::now();
        let root = validate_root(&self.config.root)?;
        let date = self.config.date.unwrap_or_else(|| Local::now().date_naive());
        let scanner = WalkDirScanner::new(self.config.scan_config.clone());
        if scanner.filter().is_empty() {
            return Err(DedupeError::Config("no file extensions configured".to_string()));
        }

        info!(root = %root.display(), algorithm = %self.config.algorithm, "starting run");
        events.send(Event::Pipeline(PipelineEvent::Started { root: root.clone() }));

        let mut state = RunState {
            index: DuplicateIndex::new(),
            mover: QuarantineMover::new(&root, date, self.config.quarantine),
            report: RunReport::new(root.clone(), self.config.algorithm, date),
        };

        if self.config.quarantine == QuarantineCreation::Eager {
            self.ensure_quarantine(&mut state, events)?;
        }

        // Phase 1: Scanning
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));

        let scan_result = scanner.scan(&root, events)?;
        for error in scan_result.errors {
            self.record_failure(&mut state.report, error)?;
        }

        let candidates = scan_result.candidates;
        state.report.files_scanned = candidates.len();

        // Phase 2: Hashing and deciding
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Hashing,
        }));
        events.send(Event::Hash(HashEvent::Started {
            total_files: candidates.len(),
        }));

        let hasher = ContentHasher::new(self.config.algorithm);
        let total = candidates.len();
        let completed = AtomicUsize::new(0);
        let hash_one = |candidate: &CandidateFile| {
            let result = hasher.hash_file(&candidate.path);
            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            match &result {
                Ok(_) => events.send(Event::Hash(HashEvent::Progress(HashProgress {
                    completed: done,
                    total,
                    current_path: candidate.path.clone(),
                }))),
                Err(e) => events.send(Event::Hash(HashEvent::Error {
                    path: candidate.path.clone(),
                    message: e.to_string(),
                })),
            }
            result
        };

        match self.config.hashing {
            HashingMode::Sequential => {
                for candidate in &candidates {
                    let hashed = hash_one(candidate);
                    self.decide(&mut state, candidate, hashed, events)?;
                }
            }
            HashingMode::Parallel => {
                // Collect keeps traversal order, so first-seen-wins does
                // not depend on which hash finishes first.
                let hashes: Vec<Result<ContentIdentity, ReadError>> =
                    candidates.par_iter().map(hash_one).collect();

                events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
                    phase: PipelinePhase::Deciding,
                }));

                for (candidate, hashed) in candidates.iter().zip(hashes) {
                    self.decide(&mut state, candidate, hashed, events)?;
                }
            }
        }

        events.send(Event::Hash(HashEvent::Completed {
            total_hashed: completed.load(Ordering::SeqCst),
        }));

        let RunState {
            index, mut report, ..
        } = state;
        report.canonical = index.into_canonical_map();
        report.duplicates_relocated = report.relocations.len();
        report.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            scanned = report.files_scanned,
            relocated = report.duplicates_relocated,
            errors = report.error_count(),
            "run complete"
        );

        Ok(report)
    }

    /// Classify one hashed candidate and relocate it if it is a duplicate.
    fn decide(
        &self,
        state: &mut RunState,
        candidate: &CandidateFile,
        hashed: Result<ContentIdentity, ReadError>,
        events: &EventSender,
    ) -> Result<(), DedupeError> {
        let identity = match hashed {
            Ok(identity) => identity,
            Err(e) => return self.record_failure(&mut state.report, e.into()),
        };

        let (canonical, sequence) = match state.index.classify(&identity, &candidate.path)? {
            Classification::Canonical => {
                debug!(path = %candidate.path.display(), identity = %identity, "canonical");
                return Ok(());
            }
            Classification::Duplicate {
                canonical,
                sequence,
            } => (canonical, sequence),
        };

        self.ensure_quarantine(state, events)?;

        match state.mover.relocate(candidate, &identity, sequence) {
            Ok(destination) => {
                info!(
                    from = %candidate.path.display(),
                    to = %destination.display(),
                    canonical = %canonical.display(),
                    "moved duplicate to quarantine"
                );
                events.send(Event::Quarantine(QuarantineEvent::Relocated {
                    from: candidate.path.clone(),
                    to: destination.clone(),
                    canonical: canonical.clone(),
                }));
                state.report.relocations.push(Relocation {
                    from: candidate.path.clone(),
                    to: destination,
                    canonical,
                    identity: identity.to_hex(),
                    sequence,
                });
                Ok(())
            }
            Err(e) => {
                events.send(Event::Quarantine(QuarantineEvent::Error {
                    path: candidate.path.clone(),
                    message: e.to_string(),
                }));
                self.record_failure(&mut state.report, e.into())
            }
        }
    }

    fn ensure_quarantine(
        &self,
        state: &mut RunState,
        events: &EventSender,
    ) -> Result<(), DedupeError> {
        if state.mover.is_created() {
            return Ok(());
        }
        let folder = state.mover.ensure_folder()?.to_path_buf();
        events.send(Event::Quarantine(QuarantineEvent::FolderReady {
            path: folder.clone(),
        }));
        state.report.quarantine_dir = Some(folder);
        Ok(())
    }

    /// Record a per-file error, or fail the run under `ErrorPolicy::Abort`.
    fn record_failure(&self, report: &mut RunReport, error: FileError) -> Result<(), DedupeError> {
        warn!(path = %error.path().display(), error = %error, "per-file error");
        report.errors.push(ReportedError::from(&error));

        match self.config.error_policy {
            ErrorPolicy::Continue => Ok(()),
            ErrorPolicy::Abort => Err(DedupeError::Aborted { source: error }),
        }
    }
}

/// Check the root is an existing directory and make it absolute.
fn validate_root(root: &Path) -> Result<PathBuf, DedupeError> {
    if root.as_os_str().is_empty() || !root.is_dir() {
        return Err(DedupeError::InvalidRoot {
            path: root.to_path_buf(),
        });
    }
    std::path::absolute(root).map_err(|source| DedupeError::Traversal {
        path: root.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventChannel;
    use std::fs;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
    }

    fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    fn pipeline(root: &Path) -> PipelineBuilder {
        Pipeline::builder().root(root).date(date())
    }

    #[test]
    fn pipeline_builder_sets_config() {
        let pipeline = Pipeline::builder()
            .root("/media")
            .recursive(false)
            .extensions(["jpg"])
            .algorithm(DigestAlgorithm::Blake3)
            .hashing(HashingMode::Sequential)
            .quarantine(QuarantineCreation::Eager)
            .error_policy(ErrorPolicy::Abort)
            .build();

        let config = pipeline.config();
        assert_eq!(config.root, PathBuf::from("/media"));
        assert!(!config.scan_config.recursive);
        assert_eq!(config.scan_config.extensions, vec!["jpg".to_string()]);
        assert_eq!(config.algorithm, DigestAlgorithm::Blake3);
        assert_eq!(config.hashing, HashingMode::Sequential);
        assert_eq!(config.quarantine, QuarantineCreation::Eager);
        assert_eq!(config.error_policy, ErrorPolicy::Abort);
    }

    #[test]
    fn defaults_are_recursive_sha1_media_set() {
        let config = PipelineConfig::default();
        assert!(config.scan_config.recursive);
        assert_eq!(config.algorithm, DigestAlgorithm::Sha1);
        assert_eq!(config.scan_config.extensions.len(), 8);
    }

    #[test]
    fn pipeline_handles_empty_directory() {
        let temp_dir = TempDir::new().unwrap();

        let report = pipeline(temp_dir.path()).build().run().unwrap();

        assert_eq!(report.files_scanned, 0);
        assert_eq!(report.duplicates_relocated, 0);
        assert!(report.quarantine_dir.is_none());
    }

    #[test]
    fn missing_root_is_invalid() {
        let result = Pipeline::builder()
            .root("/nonexistent/path/that/does/not/exist")
            .build()
            .run();

        assert!(matches!(result, Err(DedupeError::InvalidRoot { .. })));
    }

    #[test]
    fn empty_root_is_invalid() {
        let result = Pipeline::builder().build().run();
        assert!(matches!(result, Err(DedupeError::InvalidRoot { .. })));
    }

    #[test]
    fn empty_extension_list_is_config_error() {
        let temp_dir = TempDir::new().unwrap();

        let result = pipeline(temp_dir.path())
            .extensions(Vec::<String>::new())
            .build()
            .run();

        assert!(matches!(result, Err(DedupeError::Config(_))));
    }

    #[test]
    fn duplicate_is_moved_and_canonical_stays() {
        let temp_dir = TempDir::new().unwrap();
        let a = write(temp_dir.path(), "a.jpg", b"X");
        let b = write(temp_dir.path(), "b.jpg", b"X");

        let report = pipeline(temp_dir.path()).build().run().unwrap();

        let quarantine = temp_dir.path().join("DeDupedFiles.01-02-2024");
        assert!(a.exists());
        assert!(!b.exists());
        assert_eq!(fs::read(quarantine.join("b_1.jpg")).unwrap(), b"X");
        assert_eq!(report.duplicates_relocated, 1);
        assert_eq!(report.distinct_files(), 1);
        assert_eq!(report.relocations[0].sequence, 1);
        assert!(report.relocations[0].canonical.ends_with("a.jpg"));
    }

    #[test]
    fn first_in_path_order_wins_in_both_modes() {
        for mode in [HashingMode::Sequential, HashingMode::Parallel] {
            let temp_dir = TempDir::new().unwrap();
            let names = ["m.jpg", "a_very_long_name.jpg", "z.jpg", "b.jpg"];
            for name in names {
                write(temp_dir.path(), name, b"same");
            }

            let report = pipeline(temp_dir.path()).hashing(mode).build().run().unwrap();

            assert!(temp_dir.path().join("a_very_long_name.jpg").exists());
            assert_eq!(report.duplicates_relocated, 3);
            let sequences: Vec<u32> = report.relocations.iter().map(|r| r.sequence).collect();
            assert_eq!(sequences, vec![1, 2, 3]);
        }
    }

    #[test]
    fn eager_quarantine_creates_folder_without_duplicates() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "a.jpg", b"1");

        let report = pipeline(temp_dir.path())
            .quarantine(QuarantineCreation::Eager)
            .build()
            .run()
            .unwrap();

        let quarantine = temp_dir.path().join("DeDupedFiles.01-02-2024");
        assert!(quarantine.is_dir());
        assert_eq!(report.quarantine_dir.as_deref(), Some(quarantine.as_path()));
    }

    #[test]
    fn lazy_quarantine_leaves_no_folder_without_duplicates() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "a.jpg", b"1");
        write(temp_dir.path(), "b.jpg", b"2");

        pipeline(temp_dir.path()).build().run().unwrap();

        assert!(!temp_dir.path().join("DeDupedFiles.01-02-2024").exists());
    }

    #[test]
    fn quarantine_blocked_by_file_fails_run() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "DeDupedFiles.01-02-2024", b"in the way");
        let a = write(temp_dir.path(), "a.jpg", b"X");
        let b = write(temp_dir.path(), "b.jpg", b"X");

        let result = pipeline(temp_dir.path()).build().run();

        assert!(matches!(result, Err(DedupeError::DirectoryCreate(_))));
        assert!(a.exists());
        assert!(b.exists());
    }

    #[test]
    fn events_report_relocations() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "a.jpg", b"X");
        write(temp_dir.path(), "b.jpg", b"X");

        let (sender, receiver) = EventChannel::new();
        pipeline(temp_dir.path())
            .build()
            .run_with_events(&sender)
            .unwrap();
        drop(sender);

        let events: Vec<Event> = receiver.iter().collect();
        let relocated = events
            .iter()
            .filter(|e| matches!(e, Event::Quarantine(QuarantineEvent::Relocated { .. })))
            .count();
        assert_eq!(relocated, 1);
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::Pipeline(PipelineEvent::Completed { .. }))));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_is_recorded_and_run_continues() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let locked = write(temp_dir.path(), "a.jpg", b"X");
        write(temp_dir.path(), "b.jpg", b"Y");
        write(temp_dir.path(), "c.jpg", b"Y");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Root can read anything; nothing to check in that case.
        if fs::read(&locked).is_ok() {
            return;
        }

        let report = pipeline(temp_dir.path()).build().run().unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

        assert_eq!(report.error_count(), 1);
        assert_eq!(report.errors[0].kind, crate::error::ErrorKind::Read);
        assert_eq!(report.duplicates_relocated, 1);
    }

    #[cfg(unix)]
    #[test]
    fn failed_move_is_recorded_and_later_duplicates_still_move() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let a = write(temp_dir.path(), "a.jpg", b"X");
        let stuck = write(temp_dir.path(), "locked/b.jpg", b"X");
        let z = write(temp_dir.path(), "z.jpg", b"X");
        let locked_dir = temp_dir.path().join("locked");
        fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o555)).unwrap();

        // Root can still unlink from a read-only directory.
        let write_check = locked_dir.join("write_check");
        if fs::File::create(&write_check).is_ok() {
            let _ = fs::remove_file(&write_check);
            fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let report = pipeline(temp_dir.path())
            .hashing(HashingMode::Sequential)
            .build()
            .run();
        fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o755)).unwrap();
        let report = report.unwrap();

        let quarantine = temp_dir.path().join("DeDupedFiles.01-02-2024");
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.errors[0].kind, crate::error::ErrorKind::Move);
        assert_eq!(report.errors[0].path, stuck);
        assert_eq!(fs::read(&stuck).unwrap(), b"X");
        assert!(!quarantine.join("b_1.jpg").exists());

        assert!(a.exists());
        assert!(!z.exists());
        assert_eq!(report.duplicates_relocated, 1);
        assert_eq!(report.relocations[0].sequence, 2);
        assert_eq!(fs::read(quarantine.join("z_2.jpg")).unwrap(), b"X");
    }

    #[cfg(unix)]
    #[test]
    fn abort_policy_fails_on_first_file_error() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let locked = write(temp_dir.path(), "a.jpg", b"X");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        if fs::read(&locked).is_ok() {
            return;
        }

        let result = pipeline(temp_dir.path())
            .error_policy(ErrorPolicy::Abort)
            .build()
            .run();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

        assert!(matches!(result, Err(DedupeError::Aborted { .. })));
    }
}
