// src/changeset.rs

//! Change-set resolution between the baseline and candidate builds
//!
//! A candidate class belongs to the change set when its digest appears
//! nowhere in the baseline, whatever it is called there. A class that was
//! only renamed therefore stays out, and a class that kept its name but
//! changed bytes goes in. Only those classes may be redistributed.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::index::HashIndex;
use crate::mapping::MappingTable;

/// Bootstrap class injected by the workspace to launch the game
pub const START_CLASS: &str = "acp/client/Start";

/// Identifiers of the candidate classes that must be distributed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    ids: BTreeSet<String>,
}

/// Files of a change set, split by whether they exist on disk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFiles {
    pub present: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
}

/// On-disk class file name for a changed identifier
///
/// Readable names are translated back to their obfuscated name; anything the
/// mapping table does not know (new mod classes) keeps its own simple name.
pub fn distributable_name(id: &str, mapping: &MappingTable) -> String {
    let name = match mapping.obfuscated_for(id) {
        Some(obfuscated) => obfuscated,
        None => id.rsplit('/').next().unwrap_or(id),
    };
    format!("{name}.class")
}

impl ChangeSet {
    pub fn compute<S: AsRef<str>>(
        baseline: &HashIndex,
        candidate: &HashIndex,
        excluded: &[S],
    ) -> Self {
        let known: HashSet<&str> = baseline.digests();
        let excluded: HashSet<&str> = excluded.iter().map(|s| s.as_ref()).collect();

        let ids: BTreeSet<String> = candidate
            .iter()
            .filter(|(id, _)| !excluded.contains(id))
            .filter(|(_, digest)| !known.contains(digest))
            .map(|(id, _)| id.to_string())
            .collect();

        debug!(
            "{} of {} candidate classes differ from the baseline",
            ids.len(),
            candidate.len()
        );
        Self { ids }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Distinct distributable file names, sorted
    pub fn file_names(&self, mapping: &MappingTable) -> BTreeSet<String> {
        self.ids
            .iter()
            .map(|id| distributable_name(id, mapping))
            .collect()
    }

    /// Resolve every file name against the obfuscated classes directory
    ///
    /// Missing files are logged and reported instead of failing the whole
    /// resolution.
    pub fn resolve_files(&self, mapping: &MappingTable, obf_dir: &Path) -> ResolvedFiles {
        let mut resolved = ResolvedFiles::default();

        for name in self.file_names(mapping) {
            let path = obf_dir.join(&name);
            if path.is_file() {
                resolved.present.push(path);
            } else {
                warn!("Changed class {} not found at {}, skipping", name, path.display());
                resolved.missing.push(path);
            }
        }

        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_mapping() -> MappingTable {
        MappingTable::default()
    }

    #[test]
    fn test_novel_digest_included_and_start_excluded() {
        let baseline = HashIndex::from_entries([("a/B", "h1"), ("a/C", "h2")]);
        let candidate =
            HashIndex::from_entries([("a/B", "h1"), ("a/D", "h3"), ("acp/client/Start", "h9")]);

        let changes = ChangeSet::compute(&baseline, &candidate, &[START_CLASS]);

        assert_eq!(changes.iter().collect::<Vec<_>>(), vec!["a/D"]);
    }

    #[test]
    fn test_renamed_class_is_not_a_change() {
        let baseline = HashIndex::from_entries([("a/Old", "same")]);
        let candidate = HashIndex::from_entries([("a/New", "same")]);

        let changes = ChangeSet::compute(&baseline, &candidate, &[START_CLASS]);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_same_name_new_bytes_is_a_change() {
        let baseline = HashIndex::from_entries([("a/B", "h1")]);
        let candidate = HashIndex::from_entries([("a/B", "h1-modified")]);

        let changes = ChangeSet::compute(&baseline, &candidate, &[START_CLASS]);
        assert!(changes.contains("a/B"));
    }

    #[test]
    fn test_digest_matched_under_other_name_is_not_a_change() {
        // a/B changed, but its new bytes equal a different baseline class
        let baseline = HashIndex::from_entries([("a/B", "h1"), ("a/C", "h2")]);
        let candidate = HashIndex::from_entries([("a/B", "h2")]);

        let changes = ChangeSet::compute(&baseline, &candidate, &[START_CLASS]);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_membership_property() {
        let baseline = HashIndex::from_entries([("p/A", "1"), ("p/B", "2"), ("p/C", "3")]);
        let candidate = HashIndex::from_entries([
            ("p/A", "1"),
            ("p/B", "20"),
            ("p/X", "3"),
            ("p/Y", "40"),
            ("acp/client/Start", "50"),
        ]);

        let changes = ChangeSet::compute(&baseline, &candidate, &[START_CLASS]);
        let baseline_digests = baseline.digests();
        for (id, digest) in candidate.iter() {
            let expected = id != START_CLASS && !baseline_digests.contains(digest);
            assert_eq!(changes.contains(id), expected, "identifier {id}");
        }
    }

    #[test]
    fn test_excluded_only_by_exact_match() {
        let baseline = HashIndex::default();
        let candidate = HashIndex::from_entries([
            ("acp/client/Start", "h1"),
            ("acp/client/StartHelper", "h2"),
        ]);

        let changes = ChangeSet::compute(&baseline, &candidate, &[START_CLASS]);
        assert_eq!(
            changes.iter().collect::<Vec<_>>(),
            vec!["acp/client/StartHelper"]
        );
    }

    #[test]
    fn test_distributable_names() {
        let mapping = MappingTable::from_pairs([("obf1", "a/D")]).unwrap();
        assert_eq!(distributable_name("a/D", &mapping), "obf1.class");
        assert_eq!(distributable_name("a/E", &mapping), "E.class");
        assert_eq!(distributable_name("Toplevel", &empty_mapping()), "Toplevel.class");
    }

    #[test]
    fn test_resolve_files_splits_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("obf1.class"), b"x").unwrap();

        let mapping = MappingTable::from_pairs([("obf1", "a/D")]).unwrap();
        let baseline = HashIndex::default();
        let candidate = HashIndex::from_entries([("a/D", "h3"), ("mod/Ruby", "h4")]);
        let changes = ChangeSet::compute(&baseline, &candidate, &[START_CLASS]);

        let resolved = changes.resolve_files(&mapping, dir.path());

        assert_eq!(resolved.present, vec![dir.path().join("obf1.class")]);
        assert_eq!(resolved.missing, vec![dir.path().join("Ruby.class")]);
    }

    #[test]
    fn test_file_names_are_deduplicated() {
        let candidate = HashIndex::from_entries([("one/Same", "h1"), ("two/Same", "h2")]);
        let changes = ChangeSet::compute(&HashIndex::default(), &candidate, &[START_CLASS]);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes.file_names(&empty_mapping()).len(), 1);
    }
}
