//! The release table shipped with the installer.

use crate::error::Result;
use crate::platform::{Arch, Os, PlatformKey};

use super::{ReleaseEntry, ReleaseTable};

pub const SD_LOCAL_NAME: &str = "sd-local";
pub const SD_LOCAL_VERSION: &str = "1.0.58";
pub const SD_LOCAL_BASE_URL: &str = "https://github.com/screwdriver-cd/sd-local/releases";

const SD_LOCAL_CHECKSUMS: [(Os, Arch, &str); 4] = [
    (
        Os::Macos,
        Arch::Amd64,
        "6b6d375bd3e8259b1311a94d43d7f8788ad34c78714fdc625f3bf3b56e960094",
    ),
    (
        Os::Macos,
        Arch::Arm64,
        "f6a15d2cbb000fa6dd10cca7389316531f48c460702ddebedf557fb34c91b6ac",
    ),
    (
        Os::Linux,
        Arch::Amd64,
        "6de1f89ad4981333e2b33b42460eaa1f31ef68048b04d0b66bb92a7e8d9eb6f2",
    ),
    (
        Os::Linux,
        Arch::Arm64,
        "20b8a5c6730971925212eb8578d2dc4d314600790fddb3a7e06bb24a00caaab4",
    ),
];

/// `{base}/download/v{version}/{name}_{os}_{arch}`
pub fn release_url(base_url: &str, name: &str, version: &str, key: PlatformKey) -> String {
    format!(
        "{}/download/v{}/{}_{}_{}",
        base_url.trim_end_matches('/'),
        version,
        name,
        key.os.release_name(),
        key.arch
    )
}

/// Build the `sd-local` table, downloading from `base_url`.
pub fn sd_local_table(base_url: &str) -> Result<ReleaseTable> {
    let entries = SD_LOCAL_CHECKSUMS
        .iter()
        .map(|(os, arch, sha256)| {
            let key = PlatformKey::new(*os, *arch);
            let url = release_url(base_url, SD_LOCAL_NAME, SD_LOCAL_VERSION, key);
            ReleaseEntry::new(key, SD_LOCAL_VERSION, &url, sha256)
        })
        .collect::<Result<Vec<_>>>()?;
    ReleaseTable::new(SD_LOCAL_NAME, entries)
}
