//! Quarantine folder management and duplicate relocation.
//!
//! Duplicates are moved into `<root>/DeDupedFiles.<DD-MM-YYYY>` and renamed
//! `<stem>_<sequence>.<ext>`. A destination name is claimed with
//! `create_new` before any data is moved, so an existing file is never
//! overwritten. A move either lands the whole file at the destination and
//! removes the source, or leaves the source untouched.

use crate::core::hasher::ContentIdentity;
use crate::core::scanner::CandidateFile;
use crate::error::{DirectoryCreateError, MoveError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Prefix of every quarantine folder name
pub const QUARANTINE_PREFIX: &str = "DeDupedFiles.";

/// Date format used in quarantine folder names
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Hex characters of the identity used to disambiguate taken names
const IDENTITY_PREFIX_LEN: usize = 8;

/// Upper bound on names tried for one duplicate
const MAX_NAME_ATTEMPTS: usize = 1000;

/// When the quarantine folder is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuarantineCreation {
    /// On the first duplicate; runs without duplicates leave no folder behind
    #[default]
    Lazy,
    /// At run start, even if no duplicates turn up
    Eager,
}

/// Folder name for a run on `date`
pub fn folder_name(date: NaiveDate) -> String {
    format!("{}{}", QUARANTINE_PREFIX, date.format(DATE_FORMAT))
}

/// Whether `path` names a quarantine folder
pub fn is_quarantine_folder(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(QUARANTINE_PREFIX))
}

/// Owns the quarantine folder for one run and moves duplicates into it
#[derive(Debug)]
pub struct QuarantineMover {
    folder: PathBuf,
    creation: QuarantineCreation,
    created: bool,
}

impl QuarantineMover {
    pub fn new(root: &Path, date: NaiveDate, creation: QuarantineCreation) -> Self {
        Self {
            folder: root.join(folder_name(date)),
            creation,
            created: false,
        }
    }

    /// Path of the quarantine folder, whether or not it exists yet
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn creation(&self) -> QuarantineCreation {
        self.creation
    }

    /// Whether this run has created (or found) the folder
    pub fn is_created(&self) -> bool {
        self.created
    }

    /// Create the folder if absent. Safe to call repeatedly and concurrently.
    pub fn ensure_folder(&mut self) -> Result<&Path, DirectoryCreateError> {
        if !self.created {
            fs::create_dir_all(&self.folder).map_err(|source| DirectoryCreateError {
                path: self.folder.clone(),
                source,
            })?;
            info!(folder = %self.folder.display(), "quarantine folder ready");
            self.created = true;
        }
        Ok(&self.folder)
    }

    /// Move `candidate` into the quarantine folder. Returns the destination.
    ///
    /// The folder must already exist (see [`QuarantineMover::ensure_folder`]).
    pub fn relocate(
        &self,
        candidate: &CandidateFile,
        identity: &ContentIdentity,
        sequence: u32,
    ) -> Result<PathBuf, MoveError> {
        let destination = self.claim_destination(candidate, identity, sequence)?;

        match move_file(&candidate.path, &destination) {
            Ok(()) => {
                debug!(
                    from = %candidate.path.display(),
                    to = %destination.display(),
                    "relocated duplicate"
                );
                Ok(destination)
            }
            Err(e) => {
                // Leaves the source as the only copy.
                let _ = fs::remove_file(&destination);
                Err(e)
            }
        }
    }

    /// Reserve a free destination name by creating an empty placeholder.
    fn claim_destination(
        &self,
        candidate: &CandidateFile,
        identity: &ContentIdentity,
        sequence: u32,
    ) -> Result<PathBuf, MoveError> {
        let stem = candidate.stem();
        let extension = candidate.original_extension();
        let tag = identity.short_hex(IDENTITY_PREFIX_LEN);

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let suffix = match attempt {
                0 => format!("_{}", sequence),
                1 => format!("_{}_{}", sequence, tag),
                n => format!("_{}_{}_{}", sequence, tag, n),
            };
            // Stem and extension bytes as on disk, possibly not UTF-8.
            let mut name = stem.to_os_string();
            name.push(&suffix);
            if let Some(ext) = extension {
                name.push(".");
                name.push(ext);
            }
            let path = self.folder.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(path),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(source) => {
                    return Err(MoveError::Io {
                        from: candidate.path.clone(),
                        to: path,
                        source,
                    })
                }
            }
        }

        Err(MoveError::NoFreeName {
            from: candidate.path.clone(),
            folder: self.folder.clone(),
        })
    }
}

/// Move `from` onto the already-claimed `to`.
///
/// Tries a rename first. Across filesystems, copies, verifies the size and
/// only then removes the source.
fn move_file(from: &Path, to: &Path) -> Result<(), MoveError> {
    let io_error = |source| MoveError::Io {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    match fs::rename(from, to) {
        Ok(()) => return Ok(()),
        Err(e) if is_cross_device_error(&e) => {}
        Err(e) => return Err(io_error(e)),
    }

    let expected = fs::metadata(from).map_err(io_error)?.len();
    fs::copy(from, to).map_err(io_error)?;
    fs::File::open(to)
        .and_then(|f| f.sync_all())
        .map_err(io_error)?;

    let actual = fs::metadata(to).map_err(io_error)?.len();
    if actual != expected {
        return Err(MoveError::CopyVerification {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            expected,
            actual,
        });
    }

    fs::remove_file(from).map_err(io_error)
}

fn is_cross_device_error(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::CrossesDevices
}
