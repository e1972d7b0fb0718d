//! # Error Module
//!
//! Error types for the duplicate quarantine engine.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - every message names the path involved
//! - **Fatal vs per-file** - `DedupeError` aborts a run, `FileError` is
//!   recorded in the report and the run continues

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that end a run. Returned from `Pipeline::run`.
#[derive(Error, Debug)]
pub enum DedupeError {
    #[error("{path} is not a valid directory location")]
    InvalidRoot { path: PathBuf },

    #[error(transparent)]
    DirectoryCreate(#[from] DirectoryCreateError),

    #[error("Failed to traverse {path}: {source}")]
    Traversal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Run aborted after a per-file error: {source}")]
    Aborted {
        #[source]
        source: FileError,
    },

    #[error("Duplicate index error: {0}")]
    Index(#[from] IndexError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors tied to a single file. The run records them and moves on.
#[derive(Error, Debug)]
pub enum FileError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Move(#[from] MoveError),

    #[error("Failed to walk {path}: {message}")]
    Walk { path: PathBuf, message: String },
}

impl FileError {
    /// Path of the file the error belongs to
    pub fn path(&self) -> &PathBuf {
        match self {
            FileError::Read(e) => &e.path,
            FileError::Move(e) => e.source_path(),
            FileError::Walk { path, .. } => path,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FileError::Read(_) => ErrorKind::Read,
            FileError::Move(_) => ErrorKind::Move,
            FileError::Walk { .. } => ErrorKind::Walk,
        }
    }
}

/// A file could not be read in full while hashing
#[derive(Error, Debug)]
#[error("Failed to read {path}: {source}")]
pub struct ReadError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// A duplicate could not be relocated. The source file is left in place.
#[derive(Error, Debug)]
pub enum MoveError {
    #[error("Failed to move {from} to {to}: {source}")]
    Io {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No free name for {from} in {folder}")]
    NoFreeName { from: PathBuf, folder: PathBuf },

    #[error("Copy of {from} to {to} was incomplete: source {expected} bytes, copy {actual} bytes")]
    CopyVerification {
        from: PathBuf,
        to: PathBuf,
        expected: u64,
        actual: u64,
    },
}

impl MoveError {
    /// Path of the duplicate that failed to move
    pub fn source_path(&self) -> &PathBuf {
        match self {
            MoveError::Io { from, .. }
            | MoveError::NoFreeName { from, .. }
            | MoveError::CopyVerification { from, .. } => from,
        }
    }
}

/// The quarantine folder could not be created
#[derive(Error, Debug)]
#[error("Failed to create quarantine folder {path}: {source}")]
pub struct DirectoryCreateError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Misuse of the duplicate index
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("Content identity {identity} is already registered")]
    AlreadyRegistered { identity: String },

    #[error("Content identity {identity} has no canonical file")]
    NotRegistered { identity: String },
}

/// Category of a recorded per-file error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Read,
    Move,
    Walk,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Read => write!(f, "read"),
            ErrorKind::Move => write!(f, "move"),
            ErrorKind::Walk => write!(f, "walk"),
        }
    }
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, DedupeError>;
