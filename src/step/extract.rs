// src/step/extract.rs

//! Archive extraction steps

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{NativesSource, Step, StepContext, missing_input, output_exists};
use crate::archive::{extract_zip, extract_zip_atomic, promote_dir, staging_dir_for};
use crate::client::url_file_name;
use crate::error::Result;

/// Unpack one zip container into a directory
#[derive(Debug, Clone)]
pub struct ExtractFileStep {
    name: String,
    input: PathBuf,
    output: PathBuf,
}

impl ExtractFileStep {
    pub fn new(name: impl Into<String>, input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
            output: output.into(),
        }
    }
}

impl Step for ExtractFileStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_satisfied(&self) -> bool {
        output_exists(&self.output)
    }

    fn execute(&self, _ctx: &mut StepContext<'_>) -> Result<()> {
        if !self.input.is_file() {
            return Err(missing_input(&self.input));
        }
        info!("Extracting {} into {}", self.input.display(), self.output.display());
        let count = extract_zip_atomic(&self.input, &self.output)?;
        debug!("{} files extracted", count);
        Ok(())
    }
}

/// Download every native archive for the host platform and flatten their
/// contents into one directory
///
/// Archives are fetched in parallel but extracted one at a time in URL
/// order, so on a name collision the later archive wins.
#[derive(Debug, Clone)]
pub struct ExtractNativesStep {
    source: NativesSource,
    output: PathBuf,
}

impl ExtractNativesStep {
    pub fn new(source: NativesSource, output: impl Into<PathBuf>) -> Self {
        Self {
            source,
            output: output.into(),
        }
    }
}

impl Step for ExtractNativesStep {
    fn name(&self) -> &str {
        "natives"
    }

    fn is_satisfied(&self) -> bool {
        output_exists(&self.output)
    }

    fn execute(&self, ctx: &mut StepContext<'_>) -> Result<()> {
        let urls = self.source.resolve(ctx.platform)?;
        info!(
            "Output directory: {} ({} native archives for {})",
            self.output.display(),
            urls.len(),
            ctx.platform
        );

        let staging = staging_dir_for(&self.output)?;
        let downloads = staging.path().join("downloads");
        let out = staging.path().join("out");
        fs::create_dir_all(&out)?;

        // Index-prefixed names keep two archives with the same base name apart
        let mut jars: Vec<(&str, PathBuf)> = Vec::with_capacity(urls.len());
        for (idx, url) in urls.iter().enumerate() {
            let name = format!("{idx}-{}", url_file_name(url)?);
            jars.push((url.as_str(), downloads.join(name)));
        }

        let fetcher = ctx.fetcher;
        jars.par_iter()
            .try_for_each(|(url, dest)| fetcher.fetch(url, dest))?;

        for (_, jar) in &jars {
            info!("Extracting native archive {}", display_name(jar));
            extract_zip(jar, &out)?;
        }

        promote_dir(&out, &self.output)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
