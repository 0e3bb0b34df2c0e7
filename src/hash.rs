// src/hash.rs

//! Content digests for compiled classes
//!
//! Class hash tables are content-addressed: two classes are "the same" when
//! their digests are equal, whatever their names. Two algorithms are
//! supported:
//!
//! | Algorithm | Table extension | Notes |
//! |-----------|-----------------|-------|
//! | MD5       | `.md5`          | Default, matches existing workspaces |
//! | SHA-256   | `.sha256`       | Stronger, for new workspaces |

use md5::Md5;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Hash algorithm selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// MD5 (128-bit)
    #[default]
    Md5,
    /// SHA-256 (256-bit)
    Sha256,
}

impl HashAlgorithm {
    /// Length of the lower-hex digest string
    #[inline]
    pub const fn hex_len(&self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Sha256 => 64,
        }
    }

    /// Algorithm name, also used as the hash table file extension
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            _ => Err(Error::ParseError(format!("unknown hash algorithm: {s}"))),
        }
    }
}

/// Incremental hasher over either algorithm
pub struct Hasher {
    state: HasherState,
}

enum HasherState {
    Md5(Md5),
    Sha256(Sha256),
}

impl Hasher {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        let state = match algorithm {
            HashAlgorithm::Md5 => HasherState::Md5(Md5::new()),
            HashAlgorithm::Sha256 => HasherState::Sha256(Sha256::new()),
        };
        Self { state }
    }

    pub fn update(&mut self, data: &[u8]) {
        match &mut self.state {
            HasherState::Md5(hasher) => hasher.update(data),
            HasherState::Sha256(hasher) => hasher.update(data),
        }
    }

    /// Finalize into a lower-hex digest string
    pub fn finalize(self) -> String {
        match self.state {
            HasherState::Md5(hasher) => format!("{:x}", hasher.finalize()),
            HasherState::Sha256(hasher) => format!("{:x}", hasher.finalize()),
        }
    }
}

/// Digest of a byte slice
pub fn hash_bytes(algorithm: HashAlgorithm, data: &[u8]) -> String {
    let mut hasher = Hasher::new(algorithm);
    hasher.update(data);
    hasher.finalize()
}

/// Digest of everything readable from `reader`
pub fn hash_reader<R: Read>(algorithm: HashAlgorithm, reader: &mut R) -> io::Result<String> {
    let mut hasher = Hasher::new(algorithm);
    let mut buffer = [0u8; 8192];

    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hasher.finalize())
}

/// Digest of a file's content, streamed
pub fn hash_file(algorithm: HashAlgorithm, path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .map_err(|e| Error::IoError(format!("Failed to open {}: {e}", path.display())))?;
    hash_reader(algorithm, &mut file)
        .map_err(|e| Error::IoError(format!("Failed to read {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_md5_known_value() {
        assert_eq!(
            hash_bytes(HashAlgorithm::Md5, b"hello world"),
            "5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
    }

    #[test]
    fn test_sha256_known_value() {
        assert_eq!(
            hash_bytes(HashAlgorithm::Sha256, b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_hex_len() {
        for algo in [HashAlgorithm::Md5, HashAlgorithm::Sha256] {
            assert_eq!(hash_bytes(algo, b"x").len(), algo.hex_len());
        }
    }

    #[test]
    fn test_incremental_matches_oneshot() {
        let mut hasher = Hasher::new(HashAlgorithm::Md5);
        hasher.update(b"hello ");
        hasher.update(b"world");
        assert_eq!(hasher.finalize(), hash_bytes(HashAlgorithm::Md5, b"hello world"));
    }

    #[test]
    fn test_hash_reader() {
        let data = vec![7u8; 20_000];
        let mut cursor = std::io::Cursor::new(&data);
        let streamed = hash_reader(HashAlgorithm::Sha256, &mut cursor).unwrap();
        assert_eq!(streamed, hash_bytes(HashAlgorithm::Sha256, &data));
    }

    #[test]
    fn test_hash_file_missing() {
        let result = hash_file(HashAlgorithm::Md5, Path::new("/nonexistent/Foo.class"));
        assert!(matches!(result, Err(Error::IoError(_))));
    }

    #[test]
    fn test_algorithm_parse() {
        assert_eq!("md5".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Md5);
        assert_eq!("SHA-256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert!("crc32".parse::<HashAlgorithm>().is_err());
        assert_eq!(HashAlgorithm::default().to_string(), "md5");
    }
}
