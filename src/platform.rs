// src/platform.rs

//! Host platform detection for native library selection

use std::fmt;

/// Operating system family, as named by the version JSON's native classifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    Osx,
    Linux,
    Unknown,
}

impl Platform {
    /// Platform of the running host
    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    /// Map a Rust `target_os` style name to a platform
    ///
    /// Any unix other than macOS is treated as Linux.
    pub fn from_os_name(os: &str) -> Self {
        match os {
            "windows" => Self::Windows,
            "macos" | "osx" => Self::Osx,
            "linux" | "freebsd" | "openbsd" | "netbsd" | "dragonfly" | "solaris" | "illumos"
            | "android" => Self::Linux,
            _ => Self::Unknown,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Osx => "osx",
            Self::Linux => "linux",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_macos(&self) -> bool {
        matches!(self, Self::Osx)
    }

    /// Classifier key for this platform's natives, `None` when unknown
    pub fn natives_classifier(&self) -> Option<String> {
        match self {
            Self::Unknown => None,
            _ => Some(format!("natives-{}", self.name())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
