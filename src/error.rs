// src/error.rs

//! Crate-wide error type
//!
//! Errors are split into two families. Step-local failures (downloads,
//! extraction, a single missing class file) are logged and recorded by the
//! pipeline so the run can continue. Fatal failures (configuration, mapping
//! table consistency, initialization) abort the run immediately.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem operation failed
    #[error("I/O error: {0}")]
    IoError(String),

    /// Remote fetch failed or returned a non-success status
    #[error("download error: {0}")]
    DownloadError(String),

    /// A document (JSON, hash table, properties, coordinate) was malformed
    #[error("parse error: {0}")]
    ParseError(String),

    /// A required entry or file does not exist
    #[error("not found: {0}")]
    NotFoundError(String),

    /// Component could not be initialized or was used out of phase
    #[error("initialization error: {0}")]
    InitError(String),

    /// Required configuration is missing or invalid
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Mapping table violates its uniqueness invariants
    #[error("mapping error: {0}")]
    MappingError(String),

    /// Archive could not be read or written
    #[error("archive error: {0}")]
    ArchiveError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error must abort the whole run
    ///
    /// Everything else is treated as a step-local failure: logged, recorded
    /// and detectable downstream by the absence of the step's output.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigError(_) | Self::MappingError(_) | Self::InitError(_)
        )
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Self::ArchiveError(e.to_string())
    }
}

impl From<walkdir::Error> for Error {
    fn from(e: walkdir::Error) -> Self {
        Self::IoError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(Error::ConfigError("missing tools.properties".into()).is_fatal());
        assert!(Error::MappingError("duplicate".into()).is_fatal());
        assert!(Error::InitError("late hook".into()).is_fatal());

        assert!(!Error::DownloadError("HTTP 404".into()).is_fatal());
        assert!(!Error::NotFoundError("Foo.class".into()).is_fatal());
        assert!(!Error::Io(std::io::Error::other("boom")).is_fatal());
    }

    #[test]
    fn test_display_messages() {
        let err = Error::DownloadError("HTTP 500 from https://example.com".into());
        assert_eq!(err.to_string(), "download error: HTTP 500 from https://example.com");
    }
}
