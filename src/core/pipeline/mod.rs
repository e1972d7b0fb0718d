//! # Pipeline Module
//!
//! Orchestrates a dedupe run.
//!
//! ## Pipeline Stages
//! 1. **Validate** - The root must be an existing directory
//! 2. **Scan** - Enumerate eligible files, sorted by path
//! 3. **Hash** - Compute content identities (optionally in parallel)
//! 4. **Decide** - First file per identity stays; later ones are quarantined
//!
//! ## Parallelism
//! Hashing may run on the rayon pool. Decisions are always applied on one
//! thread in traversal order.

mod executor;

pub use executor::{ErrorPolicy, HashingMode, Pipeline, PipelineBuilder, PipelineConfig};
