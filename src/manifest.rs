// src/manifest.rs

//! Version manifest and per-version JSON documents
//!
//! The version manifest lists every published version with the URL of its
//! own JSON document. That document in turn names the game jars, the asset
//! index and the libraries (including per-platform native archives).

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::error::{Error, Result};
use crate::maven::Coordinate;
use crate::platform::Platform;

/// Organization segment of the 3-D/audio binding library with pinned natives
pub const LWJGL_ORGANIZATION: &str = "org.lwjgl";
/// Pinned binding version on Windows and Linux hosts
pub const LWJGL_VERSION: &str = "2.9.0";
/// Pinned binding version on macOS hosts
pub const LWJGL_MAC_VERSION: &str = "2.9.1";

/// Library excluded from the game's dependency list; the workspace launches
/// the game directly
const LAUNCHWRAPPER_PREFIX: &str = "net.minecraft:launchwrapper";

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::IoError(format!("Failed to read {}: {e}", path.display())))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::ParseError(format!("Failed to parse {}: {e}", path.display())))
}

/// Game side selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Client,
    Server,
}

impl Side {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Server => "server",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "client" => Ok(Self::Client),
            "server" => Ok(Self::Server),
            _ => Err(Error::ParseError(format!("unknown side: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionManifest {
    pub versions: Vec<VersionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionEntry {
    pub id: String,
    pub url: String,
}

impl VersionManifest {
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }

    /// URL of the JSON document for the version with exactly this id
    pub fn version_url(&self, id: &str) -> Result<&str> {
        self.versions
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.url.as_str())
            .ok_or_else(|| Error::NotFoundError(format!("version '{id}' not in manifest")))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Download {
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryDownloads {
    #[serde(default)]
    pub classifiers: Option<HashMap<String, Download>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Library {
    pub name: String,
    #[serde(default)]
    pub downloads: Option<LibraryDownloads>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionJson {
    #[serde(default)]
    pub libraries: Vec<Library>,
    #[serde(default)]
    pub asset_index: Option<Download>,
    #[serde(default)]
    pub downloads: HashMap<String, Download>,
}

impl VersionJson {
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }

    /// URL of the game jar for `side`
    ///
    /// Very old versions only publish a client jar.
    pub fn jar_url(&self, side: Side) -> Result<&str> {
        self.downloads
            .get(side.name())
            .map(|d| d.url.as_str())
            .ok_or_else(|| Error::NotFoundError(format!("no {side} jar in version JSON")))
    }

    pub fn asset_index_url(&self) -> Result<&str> {
        self.asset_index
            .as_ref()
            .map(|d| d.url.as_str())
            .ok_or_else(|| Error::NotFoundError("no asset index in version JSON".to_string()))
    }

    /// Native archive URLs for `platform`, in library order
    ///
    /// Unknown platforms yield an empty list.
    pub fn native_urls(&self, platform: Platform, filter: &LibraryFilter) -> Vec<String> {
        let Some(classifier) = platform.natives_classifier() else {
            debug!("No natives classifier for platform {}", platform);
            return Vec::new();
        };

        self.libraries
            .iter()
            .filter(|lib| filter.is_allowed(&lib.name, platform))
            .filter_map(|lib| {
                lib.downloads
                    .as_ref()?
                    .classifiers
                    .as_ref()?
                    .get(&classifier)
                    .map(|d| d.url.clone())
            })
            .collect()
    }

    /// Library coordinates that should become dependencies of the workspace
    pub fn library_names(&self, platform: Platform, filter: &LibraryFilter) -> Vec<String> {
        self.libraries
            .iter()
            .map(|lib| lib.name.as_str())
            .filter(|name| !name.starts_with(LAUNCHWRAPPER_PREFIX))
            .filter(|name| filter.is_allowed(name, platform))
            .map(str::to_string)
            .collect()
    }
}

/// Merge the library lists of several documents, preserving order
pub fn library_names_from(
    documents: &[VersionJson],
    platform: Platform,
    filter: &LibraryFilter,
) -> Vec<String> {
    documents
        .iter()
        .flat_map(|doc| doc.library_names(platform, filter))
        .collect()
}

/// Version pin for the binding library's platform-specific natives
///
/// Libraries outside `organization` are always allowed. Inside it, only the
/// pinned version for the host platform is, since the natives of the other
/// version do not load there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryFilter {
    pub organization: String,
    pub version: String,
    pub mac_version: String,
}

impl Default for LibraryFilter {
    fn default() -> Self {
        Self {
            organization: LWJGL_ORGANIZATION.to_string(),
            version: LWJGL_VERSION.to_string(),
            mac_version: LWJGL_MAC_VERSION.to_string(),
        }
    }
}

impl LibraryFilter {
    pub fn pinned_version(&self, platform: Platform) -> &str {
        if platform.is_macos() {
            &self.mac_version
        } else {
            &self.version
        }
    }

    pub fn is_allowed(&self, name: &str, platform: Platform) -> bool {
        if !name.contains(&self.organization) {
            return true;
        }

        let pinned = self.pinned_version(platform);
        match name.parse::<Coordinate>() {
            Ok(coord) => {
                coord.version == pinned || coord.version.starts_with(&format!("{pinned}-"))
            }
            Err(_) => name.contains(pinned),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "latest": {"release": "1.20.1"},
        "versions": [
            {"id": "b1.7.3", "type": "old_beta", "url": "https://meta.example.com/b1.7.3.json"},
            {"id": "a1.2.6", "type": "old_alpha", "url": "https://meta.example.com/a1.2.6.json"}
        ]
    }"#;

    const VERSION: &str = r#"{
        "id": "a1.2.6",
        "assetIndex": {"id": "pre-1.6", "url": "https://meta.example.com/pre-1.6.json"},
        "downloads": {
            "client": {"sha1": "x", "size": 1, "url": "https://cdn.example.com/abc/client.jar"}
        },
        "libraries": [
            {"name": "net.java.jinput:jinput:2.0.5",
             "downloads": {"artifact": {"url": "https://libs.example.com/jinput.jar"}}},
            {"name": "net.java.jinput:jinput-platform:2.0.5",
             "downloads": {"classifiers": {
                "natives-linux": {"url": "https://libs.example.com/jinput-linux.jar"},
                "natives-windows": {"url": "https://libs.example.com/jinput-windows.jar"}
             }}},
            {"name": "org.lwjgl.lwjgl:lwjgl-platform:2.9.0",
             "downloads": {"classifiers": {
                "natives-linux": {"url": "https://libs.example.com/lwjgl-290-linux.jar"},
                "natives-osx": {"url": "https://libs.example.com/lwjgl-290-osx.jar"}
             }}},
            {"name": "org.lwjgl.lwjgl:lwjgl-platform:2.9.1-nightly-20130708-debug3",
             "downloads": {"classifiers": {
                "natives-osx": {"url": "https://libs.example.com/lwjgl-291-osx.jar"}
             }}},
            {"name": "org.lwjgl.lwjgl:lwjgl:2.9.0"},
            {"name": "net.minecraft:launchwrapper:1.5"}
        ]
    }"#;

    #[test]
    fn test_version_url_exact_match() {
        let manifest: VersionManifest = serde_json::from_str(MANIFEST).unwrap();
        assert_eq!(
            manifest.version_url("a1.2.6").unwrap(),
            "https://meta.example.com/a1.2.6.json"
        );
        assert!(matches!(
            manifest.version_url("a1.2"),
            Err(Error::NotFoundError(_))
        ));
    }

    #[test]
    fn test_jar_and_asset_urls() {
        let json: VersionJson = serde_json::from_str(VERSION).unwrap();
        assert_eq!(
            json.jar_url(Side::Client).unwrap(),
            "https://cdn.example.com/abc/client.jar"
        );
        assert!(json.jar_url(Side::Server).is_err());
        assert_eq!(
            json.asset_index_url().unwrap(),
            "https://meta.example.com/pre-1.6.json"
        );
    }

    #[test]
    fn test_native_urls_linux() {
        let json: VersionJson = serde_json::from_str(VERSION).unwrap();
        let urls = json.native_urls(Platform::Linux, &LibraryFilter::default());
        assert_eq!(
            urls,
            vec![
                "https://libs.example.com/jinput-linux.jar",
                "https://libs.example.com/lwjgl-290-linux.jar",
            ]
        );
    }

    #[test]
    fn test_native_urls_osx_picks_mac_pin() {
        let json: VersionJson = serde_json::from_str(VERSION).unwrap();
        let urls = json.native_urls(Platform::Osx, &LibraryFilter::default());
        assert_eq!(urls, vec!["https://libs.example.com/lwjgl-291-osx.jar"]);
    }

    #[test]
    fn test_native_urls_unknown_platform_is_empty() {
        let json: VersionJson = serde_json::from_str(VERSION).unwrap();
        assert!(json
            .native_urls(Platform::Unknown, &LibraryFilter::default())
            .is_empty());
    }

    #[test]
    fn test_library_names_skip_launchwrapper_and_filter() {
        let json: VersionJson = serde_json::from_str(VERSION).unwrap();
        let names = json.library_names(Platform::Windows, &LibraryFilter::default());
        assert_eq!(
            names,
            vec![
                "net.java.jinput:jinput:2.0.5",
                "net.java.jinput:jinput-platform:2.0.5",
                "org.lwjgl.lwjgl:lwjgl-platform:2.9.0",
                "org.lwjgl.lwjgl:lwjgl:2.9.0",
            ]
        );
    }

    #[test]
    fn test_library_names_from_merges_documents() {
        let main: VersionJson = serde_json::from_str(VERSION).unwrap();
        let extra: VersionJson = serde_json::from_str(
            r#"{"libraries": [{"name": "com.paulscode:codecjorbis:20101023"}]}"#,
        )
        .unwrap();
        let names = library_names_from(&[main, extra], Platform::Linux, &LibraryFilter::default());
        assert_eq!(names.last().unwrap(), "com.paulscode:codecjorbis:20101023");
        assert_eq!(names.len(), 5);
    }

    #[test]
    fn test_filter_non_lwjgl_always_allowed() {
        let filter = LibraryFilter::default();
        for platform in [Platform::Windows, Platform::Osx, Platform::Linux, Platform::Unknown] {
            assert!(filter.is_allowed("org.ow2.asm:asm:9.5", platform));
        }
    }

    #[test]
    fn test_filter_lwjgl_pins() {
        let filter = LibraryFilter::default();
        assert!(filter.is_allowed("org.lwjgl.lwjgl:lwjgl:2.9.0", Platform::Linux));
        assert!(!filter.is_allowed("org.lwjgl.lwjgl:lwjgl:2.9.1", Platform::Linux));
        assert!(filter.is_allowed("org.lwjgl.lwjgl:lwjgl:2.9.1", Platform::Osx));
        assert!(!filter.is_allowed("org.lwjgl.lwjgl:lwjgl:2.9.0", Platform::Osx));
        assert!(filter.is_allowed(
            "org.lwjgl.lwjgl:lwjgl:2.9.1-nightly-20130708-debug3",
            Platform::Osx
        ));
        assert!(!filter.is_allowed("org.lwjgl.lwjgl:lwjgl:2.9.10", Platform::Osx));
    }

    #[test]
    fn test_side_parse() {
        assert_eq!("server".parse::<Side>().unwrap(), Side::Server);
        assert!("both".parse::<Side>().is_err());
    }
}
