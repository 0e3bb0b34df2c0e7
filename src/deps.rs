// src/deps.rs

//! Dependency configurations and the one-shot registration hook
//!
//! Steps never mutate configurations while they run. They queue a
//! `before_resolve` hook instead, and [`DependencyRegistry::resolve`] runs
//! every queued hook exactly once at the point resolution starts. Hooks only
//! see [`Configurations`], so they cannot queue further hooks.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::client::Fetcher;
use crate::error::{Error, Result};
use crate::maven::Coordinate;

/// Configuration receiving the game's own libraries
pub const IMPLEMENTATION: &str = "implementation";

type Hook = Box<dyn FnOnce(&mut Configurations) + Send>;

/// Named sets of dependency coordinates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configurations {
    sets: BTreeMap<String, Vec<Coordinate>>,
}

impl Configurations {
    /// Add `coord` to `configuration`, creating it if needed
    ///
    /// Returns `false` when an artifact with the same identity is already
    /// registered there.
    pub fn add(&mut self, configuration: &str, coord: Coordinate) -> bool {
        let set = self.sets.entry(configuration.to_string()).or_default();
        let identity = coord.identity();
        if set.iter().any(|existing| existing.identity() == identity) {
            debug!("{} already registered in {}, skipping", coord, configuration);
            return false;
        }
        info!("Registering {} in configuration {}", coord, configuration);
        set.push(coord);
        true
    }

    pub fn get(&self, configuration: &str) -> &[Coordinate] {
        self.sets
            .get(configuration)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    /// Artifact URLs of a configuration under repository `repo`
    pub fn artifact_urls(&self, configuration: &str, repo: &str, ext: &str) -> Vec<String> {
        self.get(configuration)
            .iter()
            .map(|coord| coord.url(repo, ext))
            .collect()
    }
}

#[derive(Default)]
pub struct DependencyRegistry {
    configurations: Configurations,
    pending: Vec<Hook>,
    resolved: bool,
}

impl std::fmt::Debug for DependencyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyRegistry")
            .field("configurations", &self.configurations)
            .field("pending", &self.pending.len())
            .field("resolved", &self.resolved)
            .finish()
    }
}

impl DependencyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a hook to run once, right before resolution
    pub fn before_resolve<F>(&mut self, hook: F) -> Result<()>
    where
        F: FnOnce(&mut Configurations) + Send + 'static,
    {
        if self.resolved {
            return Err(Error::InitError(
                "dependency hook registered after resolution started".to_string(),
            ));
        }
        self.pending.push(Box::new(hook));
        Ok(())
    }

    pub fn pending_hooks(&self) -> usize {
        self.pending.len()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Run every queued hook once, then freeze the registry
    ///
    /// Calling this again returns the same configurations without running
    /// anything.
    pub fn resolve(&mut self) -> &Configurations {
        if !self.resolved {
            self.resolved = true;
            let hooks = std::mem::take(&mut self.pending);
            debug!("Running {} dependency hooks", hooks.len());
            for hook in hooks {
                hook(&mut self.configurations);
            }
        }
        &self.configurations
    }

    pub fn configurations(&self) -> &Configurations {
        &self.configurations
    }

    /// Fetch every jar of a resolved configuration into `dir`
    ///
    /// Jars already present are not fetched again.
    pub fn download(
        &self,
        configuration: &str,
        repo: &str,
        dir: &Path,
        fetcher: &dyn Fetcher,
    ) -> Result<Vec<PathBuf>> {
        if !self.resolved {
            return Err(Error::InitError(format!(
                "configuration {configuration} downloaded before resolution"
            )));
        }

        let mut jars = Vec::new();
        for coord in self.configurations.get(configuration) {
            let dest = dir.join(coord.file_name("jar"));
            if dest.is_file() {
                debug!("{} already present", dest.display());
            } else {
                fetcher.fetch(&coord.url(repo, "jar"), &dest)?;
            }
            jars.push(dest);
        }
        Ok(jars)
    }
}
