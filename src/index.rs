// src/index.rs

//! Per-class content hash index
//!
//! An index maps each compiled class, named by its path relative to the
//! classes directory without the `.class` extension (`net/minecraft/src/Block`),
//! to the digest of its bytes. Indexes are rebuilt from disk on every run and
//! persisted as a plain `identifier digest` table, one class per line.

use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::hash::{HashAlgorithm, hash_file};

const CLASS_EXTENSION: &str = "class";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashIndex {
    entries: BTreeMap<String, String>,
}

/// Identifier of a class file relative to the classes root
fn class_identifier(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let parts: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    Some(parts.join("/"))
}

impl HashIndex {
    /// Hash every `.class` file under `dir`
    pub fn build(dir: &Path, algorithm: HashAlgorithm) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::NotFoundError(format!(
                "classes directory {} does not exist",
                dir.display()
            )));
        }

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type().is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(CLASS_EXTENSION)
            {
                files.push(path.to_path_buf());
            }
        }

        let entries = files
            .par_iter()
            .map(|path| {
                let id = class_identifier(dir, path).ok_or_else(|| {
                    Error::ParseError(format!("non UTF-8 class path {}", path.display()))
                })?;
                let digest = hash_file(algorithm, path)?;
                Ok((id, digest))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        info!(
            "Hashed {} classes in {} with {}",
            entries.len(),
            dir.display(),
            algorithm
        );
        Ok(Self { entries })
    }

    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parse a persisted `identifier digest` table
    pub fn parse(content: &str) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for (lineno, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut cols = line.split_whitespace();
            match (cols.next(), cols.next(), cols.next()) {
                (Some(id), Some(digest), None) => {
                    entries.insert(id.to_string(), digest.to_string());
                }
                _ => {
                    return Err(Error::ParseError(format!(
                        "hash table line {}: expected 'identifier digest', got '{}'",
                        lineno + 1,
                        line
                    )));
                }
            }
        }
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::NotFoundError(format!("hash table {}: {e}", path.display()))
        })?;
        let index = Self::parse(&content)?;
        debug!("Loaded {} hashes from {}", index.len(), path.display());
        Ok(index)
    }

    /// Persist as sorted `identifier digest` lines
    pub fn write(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut temp = NamedTempFile::new_in(dir)?;
        for (id, digest) in &self.entries {
            writeln!(temp, "{id} {digest}")?;
        }
        temp.flush()?;
        temp.persist(path).map_err(|e| {
            Error::IoError(format!("Failed to write {}: {}", path.display(), e.error))
        })?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Every distinct digest in the index
    pub fn digests(&self) -> HashSet<&str> {
        self.entries.values().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(identifier, digest)` pairs in identifier order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash_bytes;
    use std::fs;

    fn write_class(root: &Path, id: &str, bytes: &[u8]) {
        let path = root.join(format!("{id}.class"));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_build_identifiers_and_digests() {
        let dir = tempfile::tempdir().unwrap();
        write_class(dir.path(), "a", b"obf");
        write_class(dir.path(), "net/minecraft/src/Block", b"block");
        fs::write(dir.path().join("net/minecraft/src/notes.txt"), b"ignored").unwrap();

        let index = HashIndex::build(dir.path(), HashAlgorithm::Md5).unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.get("a"), Some(hash_bytes(HashAlgorithm::Md5, b"obf").as_str()));
        assert_eq!(
            index.get("net/minecraft/src/Block"),
            Some(hash_bytes(HashAlgorithm::Md5, b"block").as_str())
        );
    }

    #[test]
    fn test_build_is_deterministic() {
        let one = tempfile::tempdir().unwrap();
        let two = tempfile::tempdir().unwrap();
        // Different creation order, same content
        write_class(one.path(), "x/A", b"1");
        write_class(one.path(), "x/B", b"2");
        write_class(two.path(), "x/B", b"2");
        write_class(two.path(), "x/A", b"1");

        let a = HashIndex::build(one.path(), HashAlgorithm::Sha256).unwrap();
        let b = HashIndex::build(two.path(), HashAlgorithm::Sha256).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_build_missing_directory() {
        let result = HashIndex::build(Path::new("/nonexistent/classes"), HashAlgorithm::Md5);
        assert!(matches!(result, Err(Error::NotFoundError(_))));
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let index = HashIndex::from_entries([("b/C", "h2"), ("a/B", "h1")]);
        let path = dir.path().join("hashes/original.md5");

        index.write(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "a/B h1\nb/C h2\n");
        assert_eq!(HashIndex::load(&path).unwrap(), index);
    }

    #[test]
    fn test_parse_rejects_malformed_line() {
        let err = HashIndex::parse("a/B h1\n\nbroken\n").unwrap_err();
        assert!(err.to_string().contains("line 3"));
        assert!(HashIndex::parse("a/B h1 extra\n").is_err());
    }

    #[test]
    fn test_load_missing_table() {
        let result = HashIndex::load(Path::new("/nonexistent/modded.md5"));
        assert!(matches!(result, Err(Error::NotFoundError(_))));
    }

    #[test]
    fn test_digests() {
        let index = HashIndex::from_entries([("a", "h1"), ("b", "h1"), ("c", "h2")]);
        let digests = index.digests();
        assert_eq!(digests.len(), 2);
        assert!(digests.contains("h1"));
    }
}
