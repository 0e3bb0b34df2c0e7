// src/archive.rs

//! Archive extraction and redistributable packaging
//!
//! Extraction handles jars and native archives (both zip containers).
//! Packaging writes the same flat file list as a `.zip` and a `.tar.gz`;
//! each format is produced independently so one failing does not prevent
//! the other from being attempted.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Error, Result};

/// Extract every entry of a zip container into `dest`
///
/// Existing files are overwritten. Entries whose names would escape `dest`
/// are rejected. Returns the number of files written.
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<usize> {
    let file = File::open(archive)
        .map_err(|e| Error::IoError(format!("Failed to open {}: {e}", archive.display())))?;
    let mut zip = ZipArchive::new(BufReader::new(file)).map_err(|e| {
        Error::ArchiveError(format!("Failed to read {}: {e}", archive.display()))
    })?;

    fs::create_dir_all(dest)?;

    let mut written = 0;
    for idx in 0..zip.len() {
        let mut entry = zip.by_index(idx)?;
        let relative = entry.enclosed_name().map(Path::to_path_buf).ok_or_else(|| {
            Error::ArchiveError(format!(
                "entry '{}' in {} escapes the destination",
                entry.name(),
                archive.display()
            ))
        })?;
        let target = dest.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)
            .map_err(|e| Error::IoError(format!("Failed to create {}: {e}", target.display())))?;
        io::copy(&mut entry, &mut out)?;
        written += 1;
    }

    debug!("Extracted {} files from {}", written, archive.display());
    Ok(written)
}

/// Extract `archive` into a staging directory next to `dest`, then move the
/// result into place
///
/// `dest` only appears once extraction fully succeeded.
pub fn extract_zip_atomic(archive: &Path, dest: &Path) -> Result<usize> {
    let staging = staging_dir_for(dest)?;
    let out = staging.path().join("out");
    let written = extract_zip(archive, &out)?;
    promote_dir(&out, dest)?;
    Ok(written)
}

/// Temporary directory on the same filesystem as `dest`
pub(crate) fn staging_dir_for(dest: &Path) -> Result<tempfile::TempDir> {
    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;
    tempfile::Builder::new()
        .prefix(".acp-staging")
        .tempdir_in(&parent)
        .map_err(|e| {
            Error::IoError(format!(
                "Failed to create staging directory in {}: {e}",
                parent.display()
            ))
        })
}

/// Rename a fully populated staging directory to `dest`
pub(crate) fn promote_dir(staged: &Path, dest: &Path) -> Result<()> {
    if dest.exists() {
        // A stale empty directory from an older run would block the rename
        fs::remove_dir_all(dest)?;
    }
    fs::rename(staged, dest).map_err(|e| {
        Error::IoError(format!(
            "Failed to move {} to {}: {e}",
            staged.display(),
            dest.display()
        ))
    })
}

fn entry_name(file: &Path) -> Result<String> {
    file.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| Error::ArchiveError(format!("{} has no usable file name", file.display())))
}

fn temp_in(dest: &Path) -> Result<NamedTempFile> {
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    NamedTempFile::new_in(dir)
        .map_err(|e| Error::IoError(format!("Failed to create temp file in {}: {e}", dir.display())))
}

fn persist(temp: NamedTempFile, dest: &Path) -> Result<()> {
    temp.persist(dest)
        .map_err(|e| Error::IoError(format!("Failed to write {}: {}", dest.display(), e.error)))?;
    Ok(())
}

/// Write `files` into a deflated zip at `dest`, one flat entry per file
pub fn write_zip(files: &[PathBuf], dest: &Path) -> Result<()> {
    let temp = temp_in(dest)?;
    {
        let mut zip = ZipWriter::new(BufWriter::new(temp.as_file()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for file in files {
            let name = entry_name(file)?;
            let mut input = File::open(file)
                .map_err(|e| Error::IoError(format!("Failed to open {}: {e}", file.display())))?;
            zip.start_file(name, options)?;
            io::copy(&mut input, &mut zip)?;
        }

        zip.finish()?.flush()?;
    }
    persist(temp, dest)
}

/// Write `files` into a gzip-compressed tarball at `dest`, one flat entry per file
pub fn write_tar_gz(files: &[PathBuf], dest: &Path) -> Result<()> {
    let temp = temp_in(dest)?;
    {
        let encoder = GzEncoder::new(BufWriter::new(temp.as_file()), Compression::default());
        let mut tar = tar::Builder::new(encoder);

        for file in files {
            let name = entry_name(file)?;
            tar.append_path_with_name(file, &name).map_err(|e| {
                Error::ArchiveError(format!("Failed to add {} to tarball: {e}", file.display()))
            })?;
        }

        tar.into_inner()?.finish()?.flush()?;
    }
    persist(temp, dest)
}

/// Outcome of packaging, one result per container format
#[derive(Debug)]
pub struct ArchiveReport {
    pub zip: Result<PathBuf>,
    pub tar_gz: Result<PathBuf>,
}

impl ArchiveReport {
    pub fn is_success(&self) -> bool {
        self.zip.is_ok() && self.tar_gz.is_ok()
    }
}

/// Package `files` as `<dir>/<dir-name>.zip` and `<dir>/<dir-name>.tar.gz`
pub fn compress(files: &[PathBuf], directory: &Path) -> Result<ArchiveReport> {
    let name = directory
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            Error::ArchiveError(format!("{} has no usable name", directory.display()))
        })?
        .to_string();
    fs::create_dir_all(directory)?;

    info!(
        "Packaging {} files into {}",
        files.len(),
        directory.display()
    );

    let zip_path = directory.join(format!("{name}.zip"));
    let zip = write_zip(files, &zip_path).map(|()| zip_path);
    if let Err(e) = &zip {
        warn!("Zip archive for {} failed: {}", name, e);
    }

    let tar_path = directory.join(format!("{name}.tar.gz"));
    let tar_gz = write_tar_gz(files, &tar_path).map(|()| tar_path);
    if let Err(e) = &tar_gz {
        warn!("Tarball for {} failed: {}", name, e);
    }

    Ok(ArchiveReport { zip, tar_gz })
}
