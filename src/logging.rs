// src/logging.rs

//! Subscriber setup for the `acp` binary
//!
//! Log lines go to stderr (filtered by `RUST_LOG`, `info` by default) and,
//! when a log file is given, are also appended to it without ANSI colours.
//! Pipeline steps log inside a `step` span, so file lines carry the step
//! name as their prefix.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::error::{Error, Result};

const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber
///
/// Fails if a subscriber is already installed or the log file cannot be
/// opened.
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::InitError(format!(
                        "Failed to create log directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    Error::InitError(format!("Failed to open log file {}: {e}", path.display()))
                })?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::InitError(format!("Failed to install log subscriber: {e}")))
}
