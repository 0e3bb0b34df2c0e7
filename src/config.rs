// src/config.rs

//! Workspace configuration
//!
//! Read from `acp.toml` at the workspace root. Every key is optional:
//!
//! ```toml
//! version = "a1.2.6"
//! manifest_url = "https://launchermeta.mojang.com/mc/game/version_manifest.json"
//! maven_url = "https://github.com/ancientmc/ancientmc-maven/raw/maven/"
//! data_url = "https://example.com/acp-data-a1.2.6.zip"
//! server = false
//! tools_properties = "tools.properties"
//! excluded_classes = ["acp/client/Start"]
//! hash_algorithm = "md5"
//! failure_policy = "forgiving"
//!
//! [lwjgl]
//! organization = "org.lwjgl"
//! version = "2.9.0"
//! mac_version = "2.9.1"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::changeset::START_CLASS;
use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use crate::manifest::{LWJGL_MAC_VERSION, LWJGL_ORGANIZATION, LWJGL_VERSION, LibraryFilter};
use crate::maven::ANCIENTMC_MAVEN;
use crate::step::FailurePolicy;

/// Default configuration file name
pub const CONFIG_FILE: &str = "acp.toml";

/// Game version used when none is configured
pub const DEFAULT_VERSION: &str = "a1.2.6";

/// Mojang's launcher version manifest
pub const DEFAULT_MANIFEST_URL: &str =
    "https://launchermeta.mojang.com/mc/game/version_manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AcpConfig {
    /// Game version identifier
    #[serde(default = "default_version")]
    pub version: String,

    /// Version manifest listing every game version
    #[serde(default = "default_manifest_url")]
    pub manifest_url: String,

    /// Maven repository hosting the workspace tools
    #[serde(default = "default_maven_url")]
    pub maven_url: String,

    /// Workspace data archive (mappings, patches), if any
    #[serde(default)]
    pub data_url: Option<String>,

    /// Also fetch the server jar
    #[serde(default)]
    pub server: bool,

    /// Tool coordinates file, relative to the workspace root
    #[serde(default = "default_tools_properties")]
    pub tools_properties: PathBuf,

    /// Classes never redistributed
    #[serde(default = "default_excluded_classes")]
    pub excluded_classes: Vec<String>,

    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,

    #[serde(default)]
    pub failure_policy: FailurePolicy,

    #[serde(default)]
    pub lwjgl: LwjglSection,
}

/// Version pins for the binding library natives
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LwjglSection {
    #[serde(default = "default_lwjgl_organization")]
    pub organization: String,

    #[serde(default = "default_lwjgl_version")]
    pub version: String,

    #[serde(default = "default_lwjgl_mac_version")]
    pub mac_version: String,
}

impl Default for LwjglSection {
    fn default() -> Self {
        Self {
            organization: default_lwjgl_organization(),
            version: default_lwjgl_version(),
            mac_version: default_lwjgl_mac_version(),
        }
    }
}

impl From<&LwjglSection> for LibraryFilter {
    fn from(section: &LwjglSection) -> Self {
        Self {
            organization: section.organization.clone(),
            version: section.version.clone(),
            mac_version: section.mac_version.clone(),
        }
    }
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

fn default_manifest_url() -> String {
    DEFAULT_MANIFEST_URL.to_string()
}

fn default_maven_url() -> String {
    ANCIENTMC_MAVEN.to_string()
}

fn default_tools_properties() -> PathBuf {
    PathBuf::from("tools.properties")
}

fn default_excluded_classes() -> Vec<String> {
    vec![START_CLASS.to_string()]
}

fn default_lwjgl_organization() -> String {
    LWJGL_ORGANIZATION.to_string()
}

fn default_lwjgl_version() -> String {
    LWJGL_VERSION.to_string()
}

fn default_lwjgl_mac_version() -> String {
    LWJGL_MAC_VERSION.to_string()
}

impl Default for AcpConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            manifest_url: default_manifest_url(),
            maven_url: default_maven_url(),
            data_url: None,
            server: false,
            tools_properties: default_tools_properties(),
            excluded_classes: default_excluded_classes(),
            hash_algorithm: HashAlgorithm::default(),
            failure_policy: FailurePolicy::default(),
            lwjgl: LwjglSection::default(),
        }
    }
}

impl AcpConfig {
    /// Load configuration from a TOML file
    ///
    /// A missing file yields the defaults. A file that exists but does not
    /// parse, or holds invalid values, is a `ConfigError`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        let config = Self::parse(&content).map_err(|e| match e {
            Error::ConfigError(msg) => Error::ConfigError(format!("{}: {msg}", path.display())),
            other => other,
        })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: AcpConfig = toml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(Error::ConfigError("version must not be empty".to_string()));
        }
        url::Url::parse(&self.manifest_url)
            .map_err(|e| Error::ConfigError(format!("Invalid manifest_url: {e}")))?;
        url::Url::parse(&self.maven_url)
            .map_err(|e| Error::ConfigError(format!("Invalid maven_url: {e}")))?;
        if let Some(data_url) = &self.data_url {
            url::Url::parse(data_url)
                .map_err(|e| Error::ConfigError(format!("Invalid data_url: {e}")))?;
        }
        Ok(())
    }

    pub fn library_filter(&self) -> LibraryFilter {
        LibraryFilter::from(&self.lwjgl)
    }
}
