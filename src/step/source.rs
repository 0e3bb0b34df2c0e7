// src/step/source.rs

//! Late-bound step inputs
//!
//! The URLs of most acquisition steps live in documents that earlier steps
//! download, so they are looked up when the step executes rather than when
//! the pipeline is assembled.

use std::path::PathBuf;

use super::missing_input;
use crate::error::Result;
use crate::manifest::{LibraryFilter, Side, VersionJson, VersionManifest};
use crate::platform::Platform;

/// Where a single remote file comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteSource {
    /// A fixed URL
    Url(String),
    /// The JSON document of `version`, listed in the manifest at `manifest`
    VersionJson { manifest: PathBuf, version: String },
    /// The game jar for `side`, listed in the version JSON
    GameJar { version_json: PathBuf, side: Side },
    /// The asset index, listed in the version JSON
    AssetIndex { version_json: PathBuf },
}

impl RemoteSource {
    pub fn resolve(&self) -> Result<String> {
        match self {
            Self::Url(url) => Ok(url.clone()),
            Self::VersionJson { manifest, version } => {
                Ok(VersionManifest::load(manifest)?.version_url(version)?.to_string())
            }
            Self::GameJar { version_json, side } => {
                Ok(VersionJson::load(version_json)?.jar_url(*side)?.to_string())
            }
            Self::AssetIndex { version_json } => {
                Ok(VersionJson::load(version_json)?.asset_index_url()?.to_string())
            }
        }
    }
}

/// Where the native archive URLs come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativesSource {
    Urls(Vec<String>),
    VersionJson {
        path: PathBuf,
        filter: LibraryFilter,
    },
}

impl NativesSource {
    pub fn resolve(&self, platform: Platform) -> Result<Vec<String>> {
        match self {
            Self::Urls(urls) => Ok(urls.clone()),
            Self::VersionJson { path, filter } => {
                Ok(VersionJson::load(path)?.native_urls(platform, filter))
            }
        }
    }
}

/// Where library coordinates come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibrarySource {
    Names(Vec<String>),
    /// Merged library lists of the version JSON and extra documents
    ///
    /// The primary document must exist; absent optional documents are
    /// skipped.
    VersionJsons {
        primary: PathBuf,
        optional: Vec<PathBuf>,
        filter: LibraryFilter,
    },
}

impl LibrarySource {
    pub fn resolve(&self, platform: Platform) -> Result<Vec<String>> {
        match self {
            Self::Names(names) => Ok(names.clone()),
            Self::VersionJsons {
                primary,
                optional,
                filter,
            } => {
                if !primary.is_file() {
                    return Err(missing_input(primary));
                }
                let mut documents = vec![VersionJson::load(primary)?];
                for path in optional.iter().filter(|p| p.is_file()) {
                    documents.push(VersionJson::load(path)?);
                }
                Ok(crate::manifest::library_names_from(&documents, platform, filter))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;

    #[test]
    fn test_resolve_through_documents() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("version_manifest.json");
        let json = dir.path().join("a1.2.6.json");
        fs::write(
            &manifest,
            r#"{"versions": [{"id": "a1.2.6", "url": "https://meta/a1.2.6.json"}]}"#,
        )
        .unwrap();
        fs::write(
            &json,
            r#"{"assetIndex": {"url": "https://meta/assets.json"},
                "downloads": {"client": {"url": "https://cdn/client.jar"}}}"#,
        )
        .unwrap();

        let version = RemoteSource::VersionJson {
            manifest,
            version: "a1.2.6".into(),
        };
        assert_eq!(version.resolve().unwrap(), "https://meta/a1.2.6.json");

        let jar = RemoteSource::GameJar {
            version_json: json.clone(),
            side: Side::Client,
        };
        assert_eq!(jar.resolve().unwrap(), "https://cdn/client.jar");

        let assets = RemoteSource::AssetIndex { version_json: json };
        assert_eq!(assets.resolve().unwrap(), "https://meta/assets.json");
    }

    #[test]
    fn test_resolve_missing_document_is_io_error() {
        let source = RemoteSource::AssetIndex {
            version_json: "/nonexistent/a1.2.6.json".into(),
        };
        assert!(matches!(source.resolve(), Err(Error::IoError(_))));
    }

    #[test]
    fn test_library_source_skips_absent_optional_documents() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("a1.2.6.json");
        fs::write(&json, r#"{"libraries": [{"name": "net.java.jinput:jinput:2.0.5"}]}"#).unwrap();

        let source = LibrarySource::VersionJsons {
            primary: json,
            optional: vec![dir.path().join("jar-deps.json")],
            filter: LibraryFilter::default(),
        };
        assert_eq!(
            source.resolve(Platform::Linux).unwrap(),
            vec!["net.java.jinput:jinput:2.0.5"]
        );
    }

    #[test]
    fn test_library_source_requires_primary_document() {
        let dir = tempfile::tempdir().unwrap();
        let deps = dir.path().join("jar-deps.json");
        fs::write(&deps, r#"{"libraries": [{"name": "com.paulscode:codecjorbis:20101023"}]}"#)
            .unwrap();

        let source = LibrarySource::VersionJsons {
            primary: dir.path().join("a1.2.6.json"),
            optional: vec![deps],
            filter: LibraryFilter::default(),
        };
        assert!(matches!(
            source.resolve(Platform::Linux),
            Err(Error::NotFoundError(_))
        ));
    }
}
