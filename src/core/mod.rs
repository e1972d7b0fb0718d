//! # Core Module
//!
//! The duplicate detection and quarantine engine.
//!
//! ## Modules
//! - `scanner` - Enumerates candidate files and applies the extension filter
//! - `hasher` - Computes content identities
//! - `index` - First-seen-wins map from identity to canonical file
//! - `quarantine` - Creates the dated quarantine folder and moves duplicates
//! - `pipeline` - Orchestrates the full run
//! - `report` - Result summary of a run

pub mod hasher;
pub mod index;
pub mod pipeline;
pub mod quarantine;
pub mod report;
pub mod scanner;

// Re-export commonly used types
pub use hasher::{ContentHasher, ContentIdentity, DigestAlgorithm};
pub use index::{CanonicalRecord, Classification, DuplicateIndex};
pub use pipeline::{ErrorPolicy, HashingMode, Pipeline, PipelineBuilder};
pub use quarantine::{QuarantineCreation, QuarantineMover};
pub use report::{Relocation, ReportedError, RunReport};
pub use scanner::{CandidateFile, ExtensionFilter};
