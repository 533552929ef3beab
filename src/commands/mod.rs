use anyhow::Result;
use log::debug;
use std::path::Path;

use crate::{
    download::ArtifactSource,
    install::{Config, ConfigOptions, InstallRequest, InstalledArtifact, Installer},
    platform::{Arch, HostDetector, Os, PlatformDetector},
    release::{ReleaseTable, SD_LOCAL_BASE_URL, sd_local_table},
    runtime::Runtime,
};

mod query;
mod verify;
mod version;

pub use query::{platforms, resolve};
pub use verify::verify;
pub use version::{VERSION, version};

/// `--os` / `--arch` values; unset fields fall back to the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformOverride {
    pub os: Option<Os>,
    pub arch: Option<Arch>,
}

impl PlatformOverride {
    pub fn detector(self) -> HostDetector {
        HostDetector::with_overrides(self.os, self.arch)
    }
}

#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub version: String,
    /// File name in the bin directory; defaults to the table's binary name.
    pub name: Option<String>,
    pub platform: PlatformOverride,
    pub self_check: bool,
    pub assume_yes: bool,
}

#[tracing::instrument(skip(runtime, config_options))]
pub async fn install<R: Runtime>(
    runtime: R,
    config_options: ConfigOptions,
    options: InstallOptions,
) -> Result<()> {
    let config = Config::new(&runtime, config_options)?;
    let table = sd_local_table(&config.base_url)?;
    let installer = Installer::new(runtime, config.http_client, options.platform.detector());
    run(&installer, &table, &config.bin_dir, &options).await?;
    Ok(())
}

/// Install from `table` into `bin_dir`. Returns `None` when the user declined
/// to replace an existing binary.
#[tracing::instrument(skip(installer, table))]
pub async fn run<R: Runtime, S: ArtifactSource, D: PlatformDetector>(
    installer: &Installer<R, S, D>,
    table: &ReleaseTable,
    bin_dir: &Path,
    options: &InstallOptions,
) -> Result<Option<InstalledArtifact>> {
    let binary_name = options.name.as_deref().unwrap_or(table.name());
    let target = bin_dir.join(binary_name);

    // Fail on an unsupported platform before asking anything
    let key = installer.detector.detect()?;
    table.resolve(key, &options.version)?;

    if installer.runtime.exists(&target) && !options.assume_yes {
        debug!("{:?} already exists", target);
        if !installer
            .runtime
            .confirm(&format!("Replace existing {}?", target.display()))?
        {
            println!("Installation cancelled.");
            return Ok(None);
        }
    }

    let request = InstallRequest {
        version: &options.version,
        target_dir: bin_dir,
        binary_name,
        self_check: options.self_check,
    };
    let installed = installer.run(table, &request).await?;
    Ok(Some(installed))
}

/// The built-in table, downloading from `base_url` or the upstream release page.
pub fn release_table(base_url: Option<&str>) -> Result<ReleaseTable> {
    Ok(sd_local_table(base_url.unwrap_or(SD_LOCAL_BASE_URL))?)
}
