// src/lib.rs

//! ACP workspace tooling
//!
//! Prepares a decompilation workspace for an old game client and packages
//! the classes a mod changed for redistribution.
//!
//! # Architecture
//!
//! - Step pipeline: idempotent acquisition steps (manifests, jars, natives,
//!   libraries, tools), each skipped when its output already exists
//! - Hash indexes: per-class content digests of the original and modded builds
//! - Change sets: classes whose bytes appear nowhere in the original build,
//!   translated back to their obfuscated names via the mapping table
//! - Archives: the changed classes as a flat `.zip` and `.tar.gz`

pub mod archive;
pub mod changeset;
pub mod client;
pub mod config;
pub mod deps;
mod error;
pub mod hash;
pub mod index;
pub mod layout;
pub mod logging;
pub mod manifest;
pub mod mapping;
pub mod maven;
pub mod platform;
pub mod step;
pub mod tasks;

pub use archive::{ArchiveReport, compress};
pub use changeset::{ChangeSet, ResolvedFiles, START_CLASS, distributable_name};
pub use client::{Fetcher, HttpClient};
pub use config::AcpConfig;
pub use deps::{Configurations, DependencyRegistry};
pub use error::{Error, Result};
pub use hash::{HashAlgorithm, Hasher};
pub use index::HashIndex;
pub use layout::{HashVariant, WorkspaceLayout};
pub use mapping::{MappingFormat, MappingTable};
pub use maven::Coordinate;
pub use platform::Platform;
pub use step::{FailurePolicy, Pipeline, PipelineReport, Step, StepContext, StepOutcome};
pub use tasks::{ArchiveRequest, make_archives, make_hashes, resolve_changes, run_setup};
