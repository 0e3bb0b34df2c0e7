// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use acp::{Error, Fetcher, Result};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use zip::ZipWriter;
use zip::write::FileOptions;

/// Fetcher serving fixed content from memory.
///
/// Unknown URLs fail like an HTTP 404. Every request is recorded.
#[derive(Default)]
pub struct MapFetcher {
    files: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl MapFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&mut self, url: &str, data: impl Into<Vec<u8>>) -> &mut Self {
        self.files.insert(url.to_string(), data.into());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Fetcher for MapFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        self.requests.lock().unwrap().push(url.to_string());
        let data = self
            .files
            .get(url)
            .ok_or_else(|| Error::DownloadError(format!("HTTP 404 Not Found from {url}")))?;
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(dest, data)?;
        Ok(())
    }
}

/// Build an in-memory zip/jar with the given entries.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, data) in entries {
        zip.start_file(*name, FileOptions::default()).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Write `<root>/<id>.class` with the given bytes, creating packages.
pub fn write_class(root: &Path, id: &str, bytes: &[u8]) {
    let path = root.join(format!("{id}.class"));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, bytes).unwrap();
}

/// Entry names of a zip file.
pub fn zip_entry_names(path: &Path) -> Vec<String> {
    let mut zip = zip::ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    names
}

/// Entry names of a gzip-compressed tarball.
pub fn tar_gz_entry_names(path: &Path) -> Vec<String> {
    let file = std::fs::File::open(path).unwrap();
    let mut tar = tar::Archive::new(flate2::read::GzDecoder::new(file));
    let mut names: Vec<String> = tar
        .entries()
        .unwrap()
        .map(|e| e.unwrap().path().unwrap().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
