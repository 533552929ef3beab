pub mod artifact;
pub mod cleanup;
pub mod commands;
pub mod download;
pub mod error;
pub mod http;
pub mod install;
pub mod platform;
pub mod release;
pub mod runtime;

/// Shared fixtures for unit tests.
#[cfg(test)]
pub mod test_utils {
    use crate::platform::{Arch, MockPlatformDetector, Os, PlatformKey};
    use crate::release::{ReleaseEntry, ReleaseTable, Sha256Digest, release_url};

    pub const TEST_BASE_URL: &str = "https://example.com/releases";

    /// A table for `tool` 2.0.0 on linux and macos whose every entry hashes to `data`.
    pub fn table_for(data: &[u8]) -> ReleaseTable {
        let digest = Sha256Digest::of(data).to_hex();
        let mut entries = Vec::new();
        for os in [Os::Linux, Os::Macos] {
            for arch in Arch::ALL {
                let key = PlatformKey::new(os, arch);
                let url = release_url(TEST_BASE_URL, "tool", "2.0.0", key);
                entries.push(ReleaseEntry::new(key, "2.0.0", &url, &digest).unwrap());
            }
        }
        ReleaseTable::new("tool", entries).unwrap()
    }

    /// A detector that always reports `os`/`arch`.
    pub fn detector_for(os: Os, arch: Arch) -> MockPlatformDetector {
        let mut detector = MockPlatformDetector::new();
        detector
            .expect_detect()
            .returning(move || Ok(PlatformKey::new(os, arch)));
        detector
    }
}
