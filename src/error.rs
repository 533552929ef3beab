//! Error taxonomy for the detect → resolve → fetch → verify → install pipeline.
//!
//! Every variant is terminal for the current run. Each one carries the
//! platform, version, URL or path needed to diagnose the failure.

use std::path::PathBuf;

use thiserror::Error;

use crate::platform::PlatformKey;

pub type Result<T, E = InstallerError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum InstallerError {
    #[error("Unsupported platform: os={os}, arch={arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("No release of {name} {version} for {platform}")]
    NoMatchingRelease {
        name: String,
        version: String,
        platform: PlatformKey,
    },

    #[error(
        "Release table is corrupted: {count} entries for {name} {version} on {platform}"
    )]
    AmbiguousRelease {
        name: String,
        version: String,
        platform: PlatformKey,
        count: usize,
    },

    #[error("Invalid release table: {0}")]
    InvalidReleaseTable(String),

    #[error("Failed to download {url}: {reason}")]
    DownloadError { url: String, reason: String },

    #[error("Integrity check failed for {url}: expected sha256 {expected}, got {actual}")]
    IntegrityMismatch {
        url: String,
        expected: String,
        actual: String,
    },

    #[error("Failed to install {}: {reason}", path.display())]
    InstallError { path: PathBuf, reason: String },

    #[error("Installed binary {} failed its self-check: {reason}", path.display())]
    SelfCheckFailed { path: PathBuf, reason: String },
}

impl InstallerError {
    pub(crate) fn install(path: impl Into<PathBuf>, err: anyhow::Error) -> Self {
        InstallerError::InstallError {
            path: path.into(),
            reason: format!("{:#}", err),
        }
    }

    pub(crate) fn download(url: &str, err: anyhow::Error) -> Self {
        InstallerError::DownloadError {
            url: url.to_string(),
            reason: format!("{:#}", err),
        }
    }
}
