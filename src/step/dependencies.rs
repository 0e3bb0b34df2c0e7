// src/step/dependencies.rs

//! Dependency registration steps
//!
//! Neither step touches the configurations directly. Each parses its input
//! up front, so malformed coordinates fail the step, then queues a single
//! `before_resolve` hook on the registry.

use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info};

use super::{LibrarySource, Step, StepContext};
use crate::error::{Error, Result};
use crate::maven::Coordinate;

/// Key prefix marking tool entries in the tools properties file
pub const TOOL_PREFIX: &str = "tool_";

/// Register the game's libraries in a configuration
#[derive(Debug, Clone)]
pub struct DownloadLibrariesStep {
    source: LibrarySource,
    configuration: String,
}

impl DownloadLibrariesStep {
    pub fn new(source: LibrarySource, configuration: impl Into<String>) -> Self {
        Self {
            source,
            configuration: configuration.into(),
        }
    }
}

impl Step for DownloadLibrariesStep {
    fn name(&self) -> &str {
        "libraries"
    }

    fn is_satisfied(&self) -> bool {
        false
    }

    fn execute(&self, ctx: &mut StepContext<'_>) -> Result<()> {
        let coordinates = self
            .source
            .resolve(ctx.platform)?
            .iter()
            .map(|name| name.parse::<Coordinate>())
            .collect::<Result<Vec<_>>>()?;
        info!(
            "Queueing {} libraries for configuration {}",
            coordinates.len(),
            self.configuration
        );

        let configuration = self.configuration.clone();
        ctx.registry.before_resolve(move |configs| {
            for coord in coordinates {
                configs.add(&configuration, coord);
            }
        })
    }
}

/// Parse the `tool_<configuration>=<coordinate>` entries of a properties file
///
/// Other keys, blank lines and `#` comments are ignored. A later entry for
/// the same configuration replaces an earlier one.
pub fn parse_tool_properties(content: &str) -> Result<BTreeMap<String, Coordinate>> {
    let mut tools = BTreeMap::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let Some(configuration) = key.trim().strip_prefix(TOOL_PREFIX) else {
            continue;
        };
        if configuration.is_empty() {
            return Err(Error::ConfigError(format!(
                "tools line {}: empty configuration name",
                lineno + 1
            )));
        }
        let coord = value.trim().parse::<Coordinate>().map_err(|e| {
            Error::ConfigError(format!("tools line {}: {e}", lineno + 1))
        })?;
        tools.insert(configuration.to_string(), coord);
    }
    Ok(tools)
}

/// Register every tool listed in the tools properties file in the
/// configuration named by its key
#[derive(Debug, Clone)]
pub struct ResolveToolsStep {
    properties: PathBuf,
}

impl ResolveToolsStep {
    pub fn new(properties: impl Into<PathBuf>) -> Self {
        Self {
            properties: properties.into(),
        }
    }
}

impl Step for ResolveToolsStep {
    fn name(&self) -> &str {
        "tools"
    }

    fn is_satisfied(&self) -> bool {
        false
    }

    fn execute(&self, ctx: &mut StepContext<'_>) -> Result<()> {
        let content = std::fs::read_to_string(&self.properties).map_err(|e| {
            Error::ConfigError(format!(
                "tools properties {}: {e}",
                self.properties.display()
            ))
        })?;
        let tools = parse_tool_properties(&content)?;
        debug!("Found {} tools in {}", tools.len(), self.properties.display());

        for (configuration, coord) in tools {
            info!("Queueing {} for configuration {}", coord, configuration);
            ctx.registry.before_resolve(move |configs| {
                configs.add(&configuration, coord);
            })?;
        }
        Ok(())
    }
}
