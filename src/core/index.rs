//! First-seen-wins index from content identity to canonical file.
//!
//! The first file processed with a given identity becomes its canonical
//! owner and is never replaced. Every later file with the same identity is a
//! duplicate and only bumps the owner's counter, which supplies the sequence
//! number used in the duplicate's quarantine name.

use crate::core::hasher::ContentIdentity;
use crate::error::IndexError;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// The canonical owner of one content identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalRecord {
    /// Path of the first file seen with this identity
    pub path: PathBuf,
    /// Number of duplicates assigned a sequence number so far
    pub duplicates: u32,
}

/// Outcome of classifying one hashed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// First occurrence; the file stays where it is
    Canonical,
    /// Later occurrence of an already-owned identity
    Duplicate {
        /// Path of the canonical owner
        canonical: PathBuf,
        /// Per-identity sequence number, starting at 1
        sequence: u32,
    },
}

/// In-memory duplicate index for a single run
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    entries: HashMap<ContentIdentity, CanonicalRecord>,
}

impl DuplicateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the canonical record for an identity
    pub fn lookup(&self, identity: &ContentIdentity) -> Option<&CanonicalRecord> {
        self.entries.get(identity)
    }

    /// Make `path` the canonical owner of `identity`.
    ///
    /// Fails if the identity already has an owner; callers check `lookup` first.
    pub fn register_first(
        &mut self,
        identity: ContentIdentity,
        path: &Path,
    ) -> Result<&CanonicalRecord, IndexError> {
        use std::collections::hash_map::Entry;

        match self.entries.entry(identity) {
            Entry::Occupied(entry) => Err(IndexError::AlreadyRegistered {
                identity: entry.key().to_hex(),
            }),
            Entry::Vacant(entry) => Ok(entry.insert(CanonicalRecord {
                path: path.to_path_buf(),
                duplicates: 0,
            })),
        }
    }

    /// Increment and return the duplicate counter for `identity`.
    ///
    /// Sequence numbers start at 1 and are never handed out twice for the
    /// same identity, even if the relocation that uses them fails.
    pub fn record_duplicate(&mut self, identity: &ContentIdentity) -> Result<u32, IndexError> {
        let record = self
            .entries
            .get_mut(identity)
            .ok_or_else(|| IndexError::NotRegistered {
                identity: identity.to_hex(),
            })?;
        record.duplicates += 1;
        Ok(record.duplicates)
    }

    /// Lookup, then either register or record a duplicate.
    pub fn classify(
        &mut self,
        identity: &ContentIdentity,
        path: &Path,
    ) -> Result<Classification, IndexError> {
        let canonical = match self.lookup(identity) {
            Some(record) => record.path.clone(),
            None => {
                self.register_first(identity.clone(), path)?;
                return Ok(Classification::Canonical);
            }
        };

        let sequence = self.record_duplicate(identity)?;
        Ok(Classification::Duplicate {
            canonical,
            sequence,
        })
    }

    /// Number of distinct identities
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ContentIdentity, &CanonicalRecord)> {
        self.entries.iter()
    }

    /// Consume the index into a hex identity → canonical path map
    pub fn into_canonical_map(self) -> BTreeMap<String, PathBuf> {
        self.entries
            .into_iter()
            .map(|(identity, record)| (identity.to_hex(), record.path))
            .collect()
    }
}
