// src/client.rs

//! HTTP fetching for manifests, jars and native archives
//!
//! Downloads are streamed into a `.part` file next to the destination and
//! renamed into place only once complete, so an interrupted run never leaves
//! a truncated file that looks finished to the readiness checks.

use reqwest::blocking::{Client, Response};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Default timeout for HTTP requests
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Maximum attempts for transport-level failures
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds, multiplied by the attempt number
const RETRY_DELAY_MS: u64 = 1000;

/// Something that can place the content behind a URL at a path
///
/// Implementations must leave `dest` untouched when they fail.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Path of the in-progress download for `dest`
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

/// Last path segment of a URL, used to name downloaded archives
pub fn url_file_name(url: &str) -> Result<String> {
    let parsed = url::Url::parse(url)
        .map_err(|e| Error::ParseError(format!("invalid URL '{url}': {e}")))?;
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::ParseError(format!("URL '{url}' has no file name")))
}

/// Blocking HTTP client with retry support
pub struct HttpClient {
    client: Client,
    max_retries: u32,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("acp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
        })
    }

    /// Override the attempt count (at least one attempt is always made)
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Download `url` to `dest`
    pub fn download_file(&self, url: &str, dest: &Path) -> Result<()> {
        info!("Downloading {} to {}", url, dest.display());

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::IoError(format!("Failed to create directory {}: {e}", parent.display()))
            })?;
        }

        let mut response = self.get(url)?;
        persist_stream(&mut response, dest, url)?;
        debug!("Download of {} complete", url);
        Ok(())
    }

    /// Send a GET request, retrying transport failures
    ///
    /// Error statuses are returned immediately.
    fn get(&self, url: &str) -> Result<Response> {
        let mut attempt = 1;
        loop {
            let err = match self.client.get(url).send() {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    return Err(Error::DownloadError(format!(
                        "HTTP {} from {url}",
                        response.status()
                    )));
                }
                Err(e) => e,
            };
            if attempt >= self.max_retries {
                return Err(Error::DownloadError(format!(
                    "Failed to download {url} after {attempt} attempts: {err}"
                )));
            }
            warn!("Download attempt {} of {} failed: {}", attempt, url, err);
            std::thread::sleep(Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt)));
            attempt += 1;
        }
    }
}

/// Stream `reader` into the partial file of `dest`, then rename it into place
///
/// On failure the partial file is removed and `dest` is left untouched.
pub fn persist_stream<R: Read>(reader: &mut R, dest: &Path, url: &str) -> Result<()> {
    let partial = partial_path(dest);
    let written = File::create(&partial)
        .map_err(|e| Error::IoError(format!("Failed to create file {}: {e}", partial.display())))
        .and_then(|mut file| {
            io::copy(reader, &mut file)
                .map_err(|e| Error::DownloadError(format!("Failed to write data from {url}: {e}")))
        });

    if let Err(e) = written {
        if let Err(cleanup) = fs::remove_file(&partial) {
            debug!("Could not remove {}: {}", partial.display(), cleanup);
        }
        return Err(e);
    }

    fs::rename(&partial, dest).map_err(|e| {
        Error::IoError(format!(
            "Failed to move {} to {}: {e}",
            partial.display(),
            dest.display()
        ))
    })
}

impl Fetcher for HttpClient {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        self.download_file(url, dest)
    }
}
