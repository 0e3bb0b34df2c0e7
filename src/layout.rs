// src/layout.rs

//! Workspace directory layout
//!
//! Every path the pipeline reads or writes, relative to the workspace root:
//!
//! ```text
//! cfg/
//!   data.zip                 workspace data archive
//!   data/                    its extracted contents
//!     jar-deps.json
//!     mappings/<version>.tsrg
//!   logs/<command>.log
//!   temp/
//!     version_manifest.json
//!     <version>.json
//!     <version>-assets.json
//!     <version>.jar, <version>-server.jar
//!   libraries/<configuration>/
//! run/bin/natives/
//! build/
//!   classes/java/main/       modded classes
//!   modding/
//!     classes/original/
//!     classes/reobf/
//!     hashes/original.<algo>, modded.<algo>
//!     archives/<name>/
//! ```

use std::path::{Path, PathBuf};

use crate::hash::HashAlgorithm;

/// Which build a hash table describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashVariant {
    Original,
    Modded,
}

impl HashVariant {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Modded => "modded",
        }
    }
}

impl std::fmt::Display for HashVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    root: PathBuf,
    version: String,
}

impl WorkspaceLayout {
    pub fn new(root: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            version: version.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn cfg_dir(&self) -> PathBuf {
        self.root.join("cfg")
    }

    /// Mapping files, shipped with the data archive
    pub fn mappings_dir(&self) -> PathBuf {
        self.data_dir().join("mappings")
    }

    pub fn mapping_file(&self) -> PathBuf {
        self.mappings_dir().join(format!("{}.tsrg", self.version))
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.cfg_dir().join("logs")
    }

    pub fn log_file(&self, command: &str) -> PathBuf {
        self.logs_dir().join(format!("{command}.log"))
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.cfg_dir().join("temp")
    }

    pub fn version_manifest(&self) -> PathBuf {
        self.temp_dir().join("version_manifest.json")
    }

    pub fn version_json(&self) -> PathBuf {
        self.temp_dir().join(format!("{}.json", self.version))
    }

    pub fn asset_index(&self) -> PathBuf {
        self.temp_dir().join(format!("{}-assets.json", self.version))
    }

    /// Directory the game jars are downloaded into
    pub fn jar_dir(&self) -> PathBuf {
        self.temp_dir()
    }

    pub fn data_archive(&self) -> PathBuf {
        self.cfg_dir().join("data.zip")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.cfg_dir().join("data")
    }

    /// Libraries bundled inside the game jar, shipped with the data archive
    pub fn jar_dependencies_json(&self) -> PathBuf {
        self.data_dir().join("jar-deps.json")
    }

    /// Downloaded jars of one dependency configuration
    pub fn dependency_dir(&self, configuration: &str) -> PathBuf {
        self.cfg_dir().join("libraries").join(configuration)
    }

    pub fn natives_dir(&self) -> PathBuf {
        self.root.join("run").join("bin").join("natives")
    }

    pub fn original_classes_dir(&self) -> PathBuf {
        self.modding_dir().join("classes").join("original")
    }

    pub fn modded_classes_dir(&self) -> PathBuf {
        self.root.join("build").join("classes").join("java").join("main")
    }

    pub fn reobf_classes_dir(&self) -> PathBuf {
        self.modding_dir().join("classes").join("reobf")
    }

    pub fn classes_dir(&self, variant: HashVariant) -> PathBuf {
        match variant {
            HashVariant::Original => self.original_classes_dir(),
            HashVariant::Modded => self.modded_classes_dir(),
        }
    }

    pub fn hashes_dir(&self) -> PathBuf {
        self.modding_dir().join("hashes")
    }

    /// `original.md5` / `modded.md5` style hash table path
    pub fn hash_table(&self, variant: HashVariant, algorithm: HashAlgorithm) -> PathBuf {
        self.hashes_dir()
            .join(format!("{}.{}", variant.name(), algorithm.name()))
    }

    pub fn archive_dir(&self, name: &str) -> PathBuf {
        self.modding_dir().join("archives").join(name)
    }

    fn modding_dir(&self) -> PathBuf {
        self.root.join("build").join("modding")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let layout = WorkspaceLayout::new("/ws", "a1.2.6");
        assert_eq!(layout.mapping_file(), PathBuf::from("/ws/cfg/data/mappings/a1.2.6.tsrg"));
        assert_eq!(layout.version_json(), PathBuf::from("/ws/cfg/temp/a1.2.6.json"));
        assert_eq!(layout.asset_index(), PathBuf::from("/ws/cfg/temp/a1.2.6-assets.json"));
        assert_eq!(layout.natives_dir(), PathBuf::from("/ws/run/bin/natives"));
        assert_eq!(layout.log_file("setup"), PathBuf::from("/ws/cfg/logs/setup.log"));
        assert_eq!(
            layout.hash_table(HashVariant::Modded, HashAlgorithm::Md5),
            PathBuf::from("/ws/build/modding/hashes/modded.md5")
        );
        assert_eq!(
            layout.archive_dir("ruby"),
            PathBuf::from("/ws/build/modding/archives/ruby")
        );
        assert_eq!(
            layout.classes_dir(HashVariant::Modded),
            PathBuf::from("/ws/build/classes/java/main")
        );
    }
}
