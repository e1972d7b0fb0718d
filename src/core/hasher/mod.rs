//! # Hasher Module
//!
//! Computes content identities for files.
//!
//! A file's whole byte stream is fed through a cryptographic digest. Two
//! files with equal identities are treated as duplicates; there is no
//! further byte comparison.
//!
//! ## Supported Algorithms
//! - **SHA-1** - 160 bits, the default
//! - **SHA-256** - 256 bits
//! - **BLAKE3** - 256 bits, fastest on large media
//!
//! ## Example
//! ```rust,ignore
//! use media_deduper::core::hasher::{ContentHasher, DigestAlgorithm};
//!
//! let hasher = ContentHasher::new(DigestAlgorithm::Sha1);
//! let identity = hasher.hash_file(&path)?;
//! println!("{}", identity);
//! ```

mod identity;

pub use identity::{ContentIdentity, DigestAlgorithm};

use crate::error::ReadError;
use sha2::Digest;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Hashes file contents with a fixed digest algorithm.
///
/// Holds no open resources; each call builds and drops its own digest state.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHasher {
    algorithm: DigestAlgorithm,
}

impl ContentHasher {
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Hash the complete content of the file at `path`.
    pub fn hash_file(&self, path: &Path) -> Result<ContentIdentity, ReadError> {
        let read_error = |source| ReadError {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).map_err(read_error)?;
        let mut state = DigestState::new(self.algorithm);
        let mut buffer = vec![0u8; READ_BUFFER_SIZE];

        loop {
            match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => state.update(&buffer[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(read_error(e)),
            }
        }

        Ok(state.finish())
    }

    /// Hash an in-memory buffer with the same algorithm
    pub fn hash_bytes(&self, data: &[u8]) -> ContentIdentity {
        let mut state = DigestState::new(self.algorithm);
        state.update(data);
        state.finish()
    }
}

enum DigestState {
    Sha1(sha1::Sha1),
    Sha256(sha2::Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl DigestState {
    fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Sha1 => DigestState::Sha1(sha1::Sha1::new()),
            DigestAlgorithm::Sha256 => DigestState::Sha256(sha2::Sha256::new()),
            DigestAlgorithm::Blake3 => DigestState::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            DigestState::Sha1(h) => h.update(data),
            DigestState::Sha256(h) => h.update(data),
            DigestState::Blake3(h) => {
                h.update(data);
            }
        }
    }

    fn finish(self) -> ContentIdentity {
        match self {
            DigestState::Sha1(h) => {
                ContentIdentity::from_bytes(DigestAlgorithm::Sha1, h.finalize().as_slice())
            }
            DigestState::Sha256(h) => {
                ContentIdentity::from_bytes(DigestAlgorithm::Sha256, h.finalize().as_slice())
            }
            DigestState::Blake3(h) => {
                ContentIdentity::from_bytes(DigestAlgorithm::Blake3, h.finalize().as_bytes())
            }
        }
    }
}
