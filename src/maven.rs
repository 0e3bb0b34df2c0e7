// src/maven.rs

//! Maven-style dependency coordinates
//!
//! Coordinates have the form `group:artifact:version[:classifier]` and are
//! used both for external tool jars and for the game's own libraries. A
//! coordinate resolves to a repository path with the standard layout:
//!
//! ```text
//! <repo>/<group with dots as slashes>/<artifact>/<version>/<artifact>-<version>[-<classifier>].<ext>
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Default repository hosting the workspace tools
pub const ANCIENTMC_MAVEN: &str = "https://github.com/ancientmc/ancientmc-maven/raw/maven/";

/// A parsed `group:artifact:version[:classifier]` coordinate
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
    pub classifier: Option<String>,
}

impl Coordinate {
    /// Artifact file name, e.g. `lwjgl-2.9.0-natives-linux.jar`
    pub fn file_name(&self, ext: &str) -> String {
        match &self.classifier {
            Some(classifier) => format!("{}-{}-{}.{}", self.artifact, self.version, classifier, ext),
            None => format!("{}-{}.{}", self.artifact, self.version, ext),
        }
    }

    /// Repository-relative path of the artifact
    pub fn path(&self, ext: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group.replace('.', "/"),
            self.artifact,
            self.version,
            self.file_name(ext)
        )
    }

    /// Full artifact URL under the repository base `repo`
    pub fn url(&self, repo: &str, ext: &str) -> String {
        if repo.ends_with('/') {
            format!("{}{}", repo, self.path(ext))
        } else {
            format!("{}/{}", repo, self.path(ext))
        }
    }

    /// Identity of the artifact regardless of version
    ///
    /// Two coordinates with the same identity name the same artifact, so a
    /// configuration never holds both.
    pub fn identity(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!("{}:{}:{}", self.group, self.artifact, classifier),
            None => format!("{}:{}", self.group, self.artifact),
        }
    }
}

impl FromStr for Coordinate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if !(3..=4).contains(&parts.len()) || parts.iter().any(|p| p.is_empty()) {
            return Err(Error::ParseError(format!(
                "invalid maven coordinate '{s}' (expected group:artifact:version[:classifier])"
            )));
        }

        Ok(Self {
            group: parts[0].to_string(),
            artifact: parts[1].to_string(),
            version: parts[2].to_string(),
            classifier: parts.get(3).map(|c| c.to_string()),
        })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        Ok(())
    }
}
