// src/tasks.rs

//! Entry points tying the components together
//!
//! - [`setup_pipeline`] / [`run_setup`]: acquire everything a fresh workspace
//!   needs (manifests, jars, natives, libraries, tools)
//! - [`make_hashes`]: index one build's classes
//! - [`make_archives`]: package the classes that differ from the original game

use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::archive::{ArchiveReport, compress};
use crate::changeset::{ChangeSet, ResolvedFiles};
use crate::client::Fetcher;
use crate::config::AcpConfig;
use crate::deps::{DependencyRegistry, IMPLEMENTATION};
use crate::error::Result;
use crate::hash::HashAlgorithm;
use crate::index::HashIndex;
use crate::layout::{HashVariant, WorkspaceLayout};
use crate::manifest::Side;
use crate::mapping::MappingTable;
use crate::platform::Platform;
use crate::step::{
    DownloadFileStep, DownloadJarStep, DownloadLibrariesStep, ExtractFileStep,
    ExtractNativesStep, FailurePolicy, LibrarySource, NativesSource, Pipeline, PipelineReport,
    RemoteSource, ResolveToolsStep, StepContext,
};

/// Repository serving the game's own libraries
pub const MOJANG_LIBRARIES: &str = "https://libraries.minecraft.net/";

/// Log the tool, host and game versions once at the start of a run
pub fn log_boot(config: &AcpConfig) {
    info!(
        "acp {} on {} ({}), game version {}",
        env!("CARGO_PKG_VERSION"),
        Platform::current(),
        std::env::consts::ARCH,
        config.version
    );
}

/// Assemble the acquisition sequence for a workspace
pub fn setup_pipeline(config: &AcpConfig, layout: &WorkspaceLayout) -> Pipeline {
    let filter = config.library_filter();
    let mut pipeline = Pipeline::new(config.failure_policy);

    pipeline
        .push(DownloadFileStep::new(
            "manifest",
            RemoteSource::Url(config.manifest_url.clone()),
            layout.version_manifest(),
        ))
        .push(DownloadFileStep::new(
            "version json",
            RemoteSource::VersionJson {
                manifest: layout.version_manifest(),
                version: config.version.clone(),
            },
            layout.version_json(),
        ))
        .push(DownloadJarStep::new(
            &config.version,
            Side::Client,
            RemoteSource::GameJar {
                version_json: layout.version_json(),
                side: Side::Client,
            },
            layout.jar_dir(),
        ));

    if config.server {
        pipeline.push(DownloadJarStep::new(
            &config.version,
            Side::Server,
            RemoteSource::GameJar {
                version_json: layout.version_json(),
                side: Side::Server,
            },
            layout.jar_dir(),
        ));
    }

    pipeline.push(DownloadFileStep::new(
        "asset index",
        RemoteSource::AssetIndex {
            version_json: layout.version_json(),
        },
        layout.asset_index(),
    ));

    if let Some(data_url) = &config.data_url {
        pipeline
            .push(DownloadFileStep::new(
                "data archive",
                RemoteSource::Url(data_url.clone()),
                layout.data_archive(),
            ))
            .push(ExtractFileStep::new(
                "data",
                layout.data_archive(),
                layout.data_dir(),
            ));
    }

    pipeline
        .push(ExtractNativesStep::new(
            NativesSource::VersionJson {
                path: layout.version_json(),
                filter: filter.clone(),
            },
            layout.natives_dir(),
        ))
        .push(DownloadLibrariesStep::new(
            LibrarySource::VersionJsons {
                primary: layout.version_json(),
                optional: vec![layout.jar_dependencies_json()],
                filter,
            },
            IMPLEMENTATION,
        ))
        .push(ResolveToolsStep::new(layout.root().join(&config.tools_properties)));

    pipeline
}

/// Result of a setup run
#[derive(Debug, Default)]
pub struct SetupReport {
    pub pipeline: PipelineReport,
    /// Dependency jars present after the run
    pub jars: Vec<PathBuf>,
    /// Configurations whose jars could not all be fetched
    pub failed_configurations: Vec<String>,
}

impl SetupReport {
    pub fn is_success(&self) -> bool {
        self.pipeline.is_success() && self.failed_configurations.is_empty()
    }
}

/// Run the setup pipeline, then resolve and fetch every registered
/// dependency configuration
pub fn run_setup(
    config: &AcpConfig,
    layout: &WorkspaceLayout,
    fetcher: &dyn Fetcher,
    progress: Option<&ProgressBar>,
) -> Result<SetupReport> {
    let pipeline = setup_pipeline(config, layout);
    let mut registry = DependencyRegistry::new();

    let report = {
        let mut ctx = StepContext::new(fetcher, &mut registry);
        pipeline.run_with_progress(&mut ctx, progress)?
    };

    let configurations = registry.resolve();
    let names: Vec<String> = configurations.names().map(str::to_string).collect();

    let mut setup = SetupReport {
        pipeline: report,
        ..Default::default()
    };

    for name in names {
        let repo = if name == IMPLEMENTATION {
            MOJANG_LIBRARIES
        } else {
            config.maven_url.as_str()
        };
        match registry.download(&name, repo, &layout.dependency_dir(&name), fetcher) {
            Ok(jars) => setup.jars.extend(jars),
            Err(e) if e.is_fatal() || config.failure_policy == FailurePolicy::FailFast => {
                return Err(e);
            }
            Err(e) => {
                warn!("Dependencies of {} went wrong: {}", name, e);
                setup.failed_configurations.push(name);
            }
        }
    }

    info!(
        "Setup finished: {} steps, {} failed, {} dependency jars",
        setup.pipeline.steps.len(),
        setup.pipeline.failed().count(),
        setup.jars.len()
    );
    Ok(setup)
}

/// Hash the classes in `classes_dir` and write the table to `output`
pub fn make_hashes(classes_dir: &Path, output: &Path, algorithm: HashAlgorithm) -> Result<HashIndex> {
    let index = HashIndex::build(classes_dir, algorithm)?;
    index.write(output)?;
    info!("Wrote {} hashes to {}", index.len(), output.display());
    Ok(index)
}

/// Inputs of a packaging run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRequest {
    pub baseline: PathBuf,
    pub candidate: PathBuf,
    pub mapping: PathBuf,
    /// Directory holding the obfuscated (reobfuscated) class files
    pub obf_dir: PathBuf,
    /// Output directory; its name becomes the archive name
    pub archive_dir: PathBuf,
    pub excluded: Vec<String>,
}

impl ArchiveRequest {
    pub fn for_workspace(config: &AcpConfig, layout: &WorkspaceLayout, name: &str) -> Self {
        Self {
            baseline: layout.hash_table(HashVariant::Original, config.hash_algorithm),
            candidate: layout.hash_table(HashVariant::Modded, config.hash_algorithm),
            mapping: layout.mapping_file(),
            obf_dir: layout.reobf_classes_dir(),
            archive_dir: layout.archive_dir(name),
            excluded: config.excluded_classes.clone(),
        }
    }
}

/// Change set of a request together with its on-disk files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChanges {
    pub changes: ChangeSet,
    pub files: ResolvedFiles,
}

/// Load both hash tables and the mapping table, then resolve the changed
/// classes against the obfuscated classes directory
///
/// Missing hash tables or mapping file abort; missing class files are
/// reported in [`ResolvedFiles::missing`].
pub fn resolve_changes(request: &ArchiveRequest) -> Result<ResolvedChanges> {
    let baseline = HashIndex::load(&request.baseline)?;
    let candidate = HashIndex::load(&request.candidate)?;
    let mapping = MappingTable::load(&request.mapping)?;

    let changes = ChangeSet::compute(&baseline, &candidate, request.excluded.as_slice());
    info!(
        "{} changed classes out of {} ({} in the original)",
        changes.len(),
        candidate.len(),
        baseline.len()
    );
    let files = changes.resolve_files(&mapping, &request.obf_dir);
    Ok(ResolvedChanges { changes, files })
}

/// Outcome of [`make_archives`]
#[derive(Debug)]
pub struct ArchiveOutcome {
    pub resolved: ResolvedChanges,
    pub report: ArchiveReport,
}

/// Package every changed class that exists on disk
pub fn make_archives(request: &ArchiveRequest) -> Result<ArchiveOutcome> {
    let resolved = resolve_changes(request)?;
    if !resolved.files.missing.is_empty() {
        warn!(
            "{} changed classes are missing and will not be packaged",
            resolved.files.missing.len()
        );
    }
    let report = compress(&resolved.files.present, &request.archive_dir)?;
    Ok(ArchiveOutcome { resolved, report })
}
