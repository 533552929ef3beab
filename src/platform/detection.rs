use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::{InstallerError, Result};

/// Operating systems the installer can classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Macos,
    Linux,
    Windows,
    FreeBsd,
}

impl Os {
    pub const ALL: [Os; 4] = [Os::Macos, Os::Linux, Os::Windows, Os::FreeBsd];

    /// Classify an OS name as reported by `std::env::consts::OS` or typed by a user.
    pub fn from_host_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "macos" | "darwin" | "osx" => Some(Os::Macos),
            "linux" => Some(Os::Linux),
            "windows" => Some(Os::Windows),
            "freebsd" => Some(Os::FreeBsd),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Macos => "macos",
            Os::Linux => "linux",
            Os::Windows => "windows",
            Os::FreeBsd => "freebsd",
        }
    }

    /// Spelling used in release file names (`sd-local_darwin_amd64`).
    pub fn release_name(&self) -> &'static str {
        match self {
            Os::Macos => "darwin",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Os {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Os::from_host_name(s).ok_or_else(|| {
            format!("unknown OS '{}' (expected macos, linux, windows or freebsd)", s)
        })
    }
}

/// CPU architectures the installer can classify. 64-bit only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    Amd64,
    Arm64,
}

impl Arch {
    pub const ALL: [Arch; 2] = [Arch::Amd64, Arch::Arm64];

    /// Classify an architecture name as reported by `std::env::consts::ARCH` or typed by a user.
    pub fn from_host_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "x86_64" | "amd64" | "x64" => Some(Arch::Amd64),
            "aarch64" | "arm64" => Some(Arch::Arm64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::Amd64 => "amd64",
            Arch::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Arch::from_host_name(s)
            .ok_or_else(|| format!("unknown architecture '{}' (expected amd64 or arm64)", s))
    }
}

/// The (OS, architecture) pair that selects one release artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PlatformKey {
    pub os: Os,
    pub arch: Arch,
}

impl PlatformKey {
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Classify raw OS/arch strings. Fails if either one is unknown.
    pub fn classify(os: &str, arch: &str) -> Result<Self> {
        match (Os::from_host_name(os), Arch::from_host_name(arch)) {
            (Some(os), Some(arch)) => Ok(Self { os, arch }),
            _ => Err(InstallerError::UnsupportedPlatform {
                os: os.to_string(),
                arch: arch.to_string(),
            }),
        }
    }

    /// Classify the platform this binary was compiled for.
    pub fn host() -> Result<Self> {
        Self::classify(std::env::consts::OS, std::env::consts::ARCH)
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

/// Trait for platform detection (useful for testing)
#[cfg_attr(test, mockall::automock)]
pub trait PlatformDetector: Send + Sync {
    fn detect(&self) -> Result<PlatformKey>;
}

/// Detects the host platform, optionally overridden by explicit values.
#[derive(Debug, Default, Clone)]
pub struct HostDetector {
    os: Option<Os>,
    arch: Option<Arch>,
}

impl HostDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `os` and/or `arch` instead of the host values.
    pub fn with_overrides(os: Option<Os>, arch: Option<Arch>) -> Self {
        Self { os, arch }
    }
}

impl PlatformDetector for HostDetector {
    #[tracing::instrument(skip(self))]
    fn detect(&self) -> Result<PlatformKey> {
        let os = match self.os {
            Some(os) => os,
            None => Os::from_host_name(std::env::consts::OS).ok_or_else(|| {
                InstallerError::UnsupportedPlatform {
                    os: std::env::consts::OS.to_string(),
                    arch: std::env::consts::ARCH.to_string(),
                }
            })?,
        };
        let arch = match self.arch {
            Some(arch) => arch,
            None => Arch::from_host_name(std::env::consts::ARCH).ok_or_else(|| {
                InstallerError::UnsupportedPlatform {
                    os: std::env::consts::OS.to_string(),
                    arch: std::env::consts::ARCH.to_string(),
                }
            })?,
        };
        Ok(PlatformKey { os, arch })
    }
}
