//! Release table: which artifact to download for a platform, and how to check it.

mod builtin;
mod digest;

use log::debug;
use serde::Serialize;

use crate::error::{InstallerError, Result};
use crate::platform::PlatformKey;

pub use builtin::{
    SD_LOCAL_BASE_URL, SD_LOCAL_NAME, SD_LOCAL_VERSION, release_url, sd_local_table,
};
pub use digest::{HashAlgorithm, Sha256Digest};

/// One published artifact: a platform and version bound to a URL and digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseEntry {
    pub platform: PlatformKey,
    pub version: String,
    pub url: String,
    #[serde(rename = "sha256")]
    pub expected_hash: Sha256Digest,
    pub algorithm: HashAlgorithm,
}

impl ReleaseEntry {
    /// Build an entry, validating the digest encoding and that `url` has a
    /// `/v{version}/` path segment.
    pub fn new(platform: PlatformKey, version: &str, url: &str, sha256_hex: &str) -> Result<Self> {
        let version = normalize_version(version);
        if version.is_empty() {
            return Err(InstallerError::InvalidReleaseTable(format!(
                "empty version for {}",
                platform
            )));
        }
        if !url.contains(&format!("/v{}/", version)) {
            return Err(InstallerError::InvalidReleaseTable(format!(
                "URL '{}' for {} does not reference version {}",
                url, platform, version
            )));
        }
        let expected_hash = Sha256Digest::from_hex(sha256_hex)?;
        Ok(Self {
            platform,
            version: version.to_string(),
            url: url.to_string(),
            expected_hash,
            algorithm: HashAlgorithm::Sha256,
        })
    }

    /// Last path segment of the download URL.
    pub fn file_name(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or(&self.url)
    }

    /// Fail unless `data` hashes to the expected digest.
    pub fn verify(&self, data: &[u8]) -> Result<()> {
        verify_integrity(data, self)
    }
}

/// Compute the digest of `data` with the entry's algorithm and compare it
/// to the expected digest in constant time.
#[tracing::instrument(skip(data, entry), fields(url = %entry.url, len = data.len()))]
pub fn verify_integrity(data: &[u8], entry: &ReleaseEntry) -> Result<()> {
    let actual = match entry.algorithm {
        HashAlgorithm::Sha256 => Sha256Digest::of(data),
    };
    debug!("Calculated SHA256: {} ({} bytes)", actual, data.len());
    debug!("Expected SHA256:   {}", entry.expected_hash);

    if actual.ct_eq(&entry.expected_hash) {
        Ok(())
    } else {
        Err(InstallerError::IntegrityMismatch {
            url: entry.url.clone(),
            expected: entry.expected_hash.to_hex(),
            actual: actual.to_hex(),
        })
    }
}

/// The set of published artifacts for one binary.
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseTable {
    name: String,
    entries: Vec<ReleaseEntry>,
}

impl ReleaseTable {
    /// Duplicate (platform, version) rows are accepted here and reported by [`resolve`](Self::resolve).
    pub fn new(name: &str, entries: Vec<ReleaseEntry>) -> Result<Self> {
        if name.is_empty() {
            return Err(InstallerError::InvalidReleaseTable(
                "binary name is empty".to_string(),
            ));
        }
        if entries.is_empty() {
            return Err(InstallerError::InvalidReleaseTable(format!(
                "no entries for {}",
                name
            )));
        }
        Ok(Self {
            name: name.to_string(),
            entries,
        })
    }

    /// Binary name the table ships.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[ReleaseEntry] {
        &self.entries
    }

    /// Distinct versions, in table order.
    pub fn versions(&self) -> Vec<&str> {
        let mut versions: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !versions.contains(&entry.version.as_str()) {
                versions.push(&entry.version);
            }
        }
        versions
    }

    /// Find the single entry for `key` and `version`. A leading `v` on the
    /// version is ignored.
    #[tracing::instrument(skip(self))]
    pub fn resolve(&self, key: PlatformKey, version: &str) -> Result<&ReleaseEntry> {
        let version = normalize_version(version);
        let mut matches = self
            .entries
            .iter()
            .filter(|e| e.platform == key && e.version == version);

        let first = matches.next();
        let extra = matches.count();

        match (first, extra) {
            (Some(entry), 0) => {
                debug!("Resolved {} {} for {} -> {}", self.name, version, key, entry.url);
                Ok(entry)
            }
            (Some(_), extra) => Err(InstallerError::AmbiguousRelease {
                name: self.name.clone(),
                version: version.to_string(),
                platform: key,
                count: extra + 1,
            }),
            (None, _) => Err(InstallerError::NoMatchingRelease {
                name: self.name.clone(),
                version: version.to_string(),
                platform: key,
            }),
        }
    }
}

fn normalize_version(version: &str) -> &str {
    let version = version.trim();
    version.strip_prefix('v').unwrap_or(version)
}
