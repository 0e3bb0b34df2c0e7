// src/main.rs

use acp::config::CONFIG_FILE;
use acp::layout::HashVariant;
use acp::tasks::setup_pipeline;
use acp::{AcpConfig, ArchiveRequest, HttpClient, WorkspaceLayout};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "acp")]
#[command(author, version, about = "Workspace setup and mod packaging for ancient game clients", long_about = None)]
struct Cli {
    /// Workspace root directory
    #[arg(short, long, global = true, default_value = ".")]
    root: PathBuf,

    /// Configuration file (default: <root>/acp.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Build {
    Original,
    Modded,
}

impl From<Build> for HashVariant {
    fn from(build: Build) -> Self {
        match build {
            Build::Original => HashVariant::Original,
            Build::Modded => HashVariant::Modded,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Download and unpack everything the workspace needs
    Setup,
    /// Write the class hash table of a build
    Hashes {
        /// Which build to hash
        #[arg(value_enum)]
        build: Build,
    },
    /// Print the classes that differ from the original game
    Changes,
    /// Package the changed classes as <name>.zip and <name>.tar.gz
    Archives {
        /// Archive name
        name: String,
    },
}

impl Commands {
    fn log_name(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Hashes { .. } => "hashes",
            Self::Changes => "changes",
            Self::Archives { .. } => "archives",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(|| cli.root.join(CONFIG_FILE));
    let config = AcpConfig::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    let layout = WorkspaceLayout::new(&cli.root, &config.version);

    acp::logging::init(Some(&layout.log_file(cli.command.log_name())))?;
    acp::tasks::log_boot(&config);

    match cli.command {
        Commands::Setup => {
            let client = HttpClient::new()?;
            let progress = ProgressBar::new(setup_pipeline(&config, &layout).len() as u64);
            progress.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );

            let report = acp::run_setup(&config, &layout, &client, Some(&progress))
                .context("Workspace setup aborted")?;

            for step in report.pipeline.failed() {
                warn!("{}: {}", step.name, step.outcome);
            }
            if !report.is_success() {
                anyhow::bail!("Workspace setup finished with failures, rerun to retry");
            }
            println!("Workspace ready at {}", cli.root.display());
            Ok(())
        }
        Commands::Hashes { build } => {
            let variant = HashVariant::from(build);
            let classes = layout.classes_dir(variant);
            let output = layout.hash_table(variant, config.hash_algorithm);
            let index = acp::make_hashes(&classes, &output, config.hash_algorithm)
                .with_context(|| format!("Failed to hash {}", classes.display()))?;
            println!("{} classes hashed into {}", index.len(), output.display());
            Ok(())
        }
        Commands::Changes => {
            let request = ArchiveRequest::for_workspace(&config, &layout, "changes");
            let resolved = acp::resolve_changes(&request)?;
            for id in resolved.changes.iter() {
                println!("{id}");
            }
            for missing in &resolved.files.missing {
                warn!("Missing class file {}", missing.display());
            }
            info!("{} changed classes", resolved.changes.len());
            Ok(())
        }
        Commands::Archives { name } => {
            let request = ArchiveRequest::for_workspace(&config, &layout, &name);
            let outcome = acp::make_archives(&request)?;

            if let Ok(path) = &outcome.report.zip {
                println!("Wrote {}", path.display());
            }
            if let Ok(path) = &outcome.report.tar_gz {
                println!("Wrote {}", path.display());
            }
            if !outcome.report.is_success() {
                anyhow::bail!("Not every archive for {} could be written", name);
            }
            Ok(())
        }
    }
}
