//! # Media Deduper
//!
//! Finds files with byte-identical content and moves the redundant copies
//! into a dated quarantine folder, leaving one canonical copy in place.
//!
//! ## Core Philosophy
//! - **Never delete** - Duplicates are moved, never removed
//! - **Never overwrite** - Quarantine names are claimed before data moves
//! - **First seen wins** - Traversal order decides which copy stays
//!
//! ## Architecture
//! - `core` - The detection and quarantine engine
//! - `events` - Event-driven progress reporting
//! - `error` - Fatal and per-file error types

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{DedupeError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. Output goes to
/// stderr and is filtered by `RUST_LOG`.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    // A subscriber may already be installed (tests, embedding apps).
    let _ = tracing::subscriber::set_global_default(subscriber);
}
