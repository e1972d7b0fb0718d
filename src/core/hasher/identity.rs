//! Content identity values and the digest algorithms that produce them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cryptographic digest used to derive content identities.
///
/// Identities produced by different algorithms never compare equal, so
/// changing the algorithm makes results incomparable with earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// SHA-1, 160 bits
    #[default]
    Sha1,
    /// SHA-256, 256 bits
    Sha256,
    /// BLAKE3, 256 bits
    Blake3,
}

impl DigestAlgorithm {
    /// Length of the digest in bytes
    pub fn digest_len(&self) -> usize {
        match self {
            DigestAlgorithm::Sha1 => 20,
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Blake3 => 32,
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => "SHA-1 (160-bit)",
            DigestAlgorithm::Sha256 => "SHA-256 (256-bit)",
            DigestAlgorithm::Blake3 => "BLAKE3 (256-bit)",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestAlgorithm::Sha1 => write!(f, "sha1"),
            DigestAlgorithm::Sha256 => write!(f, "sha256"),
            DigestAlgorithm::Blake3 => write!(f, "blake3"),
        }
    }
}

/// Digest over a file's full byte content
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentIdentity {
    algorithm: DigestAlgorithm,
    bytes: Vec<u8>,
}

impl ContentIdentity {
    /// Wrap raw digest bytes
    pub fn from_bytes(algorithm: DigestAlgorithm, bytes: &[u8]) -> Self {
        Self {
            algorithm,
            bytes: bytes.to_vec(),
        }
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lower-case hexadecimal form
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// First `len` hex characters, used to disambiguate quarantine names
    pub fn short_hex(&self, len: usize) -> String {
        let mut hex = self.to_hex();
        hex.truncate(len);
        hex
    }
}

impl fmt::Display for ContentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
