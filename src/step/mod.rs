// src/step/mod.rs

//! Staged acquisition pipeline
//!
//! A pipeline is an ordered list of [`Step`]s. Before each step runs, its
//! readiness check is evaluated; a satisfied step is skipped without doing
//! any I/O. Steps run strictly one after another since later steps read the
//! files earlier ones produce.
//!
//! # Failure policy
//!
//! Step-local failures (a download that 404s, a corrupt archive) are logged
//! and recorded as [`StepOutcome::Failed`] under [`FailurePolicy::Forgiving`],
//! leaving the missing output for the caller to detect. Under
//! [`FailurePolicy::FailFast`] the first failure aborts the run. Fatal
//! errors (see [`Error::is_fatal`]) abort under either policy.

mod dependencies;
mod download;
mod extract;
mod source;

pub use dependencies::{DownloadLibrariesStep, ResolveToolsStep, TOOL_PREFIX, parse_tool_properties};
pub use download::{DownloadFileStep, DownloadJarStep, jar_file_name};
pub use extract::{ExtractFileStep, ExtractNativesStep};
pub use source::{LibrarySource, NativesSource, RemoteSource};

use indicatif::ProgressBar;
use serde::Deserialize;
use std::fmt;
use tracing::{info, info_span, warn};

use crate::client::Fetcher;
use crate::deps::DependencyRegistry;
use crate::error::{Error, Result};
use crate::platform::Platform;

/// Shared resources handed to each step
pub struct StepContext<'a> {
    pub fetcher: &'a dyn Fetcher,
    pub registry: &'a mut DependencyRegistry,
    pub platform: Platform,
}

impl<'a> StepContext<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, registry: &'a mut DependencyRegistry) -> Self {
        Self {
            fetcher,
            registry,
            platform: Platform::current(),
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }
}

/// One idempotent unit of pipeline work
pub trait Step {
    fn name(&self) -> &str;

    /// Whether the step's output is already in place
    fn is_satisfied(&self) -> bool;

    fn execute(&self, ctx: &mut StepContext<'_>) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    Skipped,
    Failed(String),
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Skipped => write!(f, "skipped"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub name: String,
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub steps: Vec<StepReport>,
}

impl PipelineReport {
    pub fn outcome(&self, name: &str) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|report| report.name == name)
            .map(|report| &report.outcome)
    }

    pub fn failed(&self) -> impl Iterator<Item = &StepReport> {
        self.steps
            .iter()
            .filter(|report| matches!(report.outcome, StepOutcome::Failed(_)))
    }

    pub fn is_success(&self) -> bool {
        self.failed().next().is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Log and record step failures, keep going
    #[default]
    Forgiving,
    /// Abort on the first failing step
    FailFast,
}

#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn Step>>,
    policy: FailurePolicy,
}

impl Pipeline {
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            steps: Vec::new(),
            policy,
        }
    }

    pub fn push<S: Step + 'static>(&mut self, step: S) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn run(&self, ctx: &mut StepContext<'_>) -> Result<PipelineReport> {
        self.run_with_progress(ctx, None)
    }

    pub fn run_with_progress(
        &self,
        ctx: &mut StepContext<'_>,
        progress: Option<&ProgressBar>,
    ) -> Result<PipelineReport> {
        let mut report = PipelineReport::default();

        for step in &self.steps {
            let span = info_span!("step", name = step.name());
            let _guard = span.enter();

            if let Some(pb) = progress {
                pb.set_message(step.name().to_string());
            }

            let outcome = if step.is_satisfied() {
                info!("Output already present, skipping");
                StepOutcome::Skipped
            } else {
                match step.execute(ctx) {
                    Ok(()) => {
                        info!("Step complete");
                        StepOutcome::Completed
                    }
                    Err(e) if e.is_fatal() || self.policy == FailurePolicy::FailFast => {
                        warn!("Step failed, aborting run: {}", e);
                        return Err(e);
                    }
                    Err(e) => {
                        warn!("Step went wrong, continuing: {}", e);
                        StepOutcome::Failed(e.to_string())
                    }
                }
            };

            report.steps.push(StepReport {
                name: step.name().to_string(),
                outcome,
            });

            if let Some(pb) = progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        Ok(report)
    }
}

/// Shorthand for steps whose readiness is "the output path exists"
pub(crate) fn output_exists(path: &std::path::Path) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => meta.len() > 0,
        Ok(meta) => meta.is_dir(),
        Err(_) => false,
    }
}

/// Error for steps that cannot proceed because an input is absent
pub(crate) fn missing_input(path: &std::path::Path) -> Error {
    Error::NotFoundError(format!("input {} does not exist", path.display()))
}
