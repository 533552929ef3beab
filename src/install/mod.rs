//! The install pipeline: detect → resolve → fetch → verify → install → self-check.

use log::{debug, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{
    artifact,
    cleanup::{self, SharedCleanupContext},
    download::{ArtifactSource, fetch_artifact},
    error::{InstallerError, Result},
    platform::{PlatformDetector, PlatformKey},
    release::{ReleaseEntry, ReleaseTable, verify_integrity},
    runtime::Runtime,
};

mod atomic;
pub mod config;
mod paths;

pub use atomic::{EXECUTABLE_MODE, install_binary, install_binary_checked, temp_path_for};
pub use config::{Config, ConfigOptions, DEFAULT_TIMEOUT_SECS};
pub use paths::{default_bin_dir, resolve_bin_dir};

/// Flag passed to the installed binary by the self-check.
pub const SELF_CHECK_FLAG: &str = "--help";

/// The binary left on disk by a successful install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledArtifact {
    pub path: PathBuf,
    pub mode: u32,
    pub entry: ReleaseEntry,
}

/// What to install and where.
#[derive(Debug, Clone)]
pub struct InstallRequest<'a> {
    pub version: &'a str,
    pub target_dir: &'a Path,
    pub binary_name: &'a str,
    pub self_check: bool,
}

pub struct Installer<R: Runtime, S: ArtifactSource, D: PlatformDetector> {
    pub runtime: R,
    pub source: S,
    pub detector: D,
}

impl<R: Runtime, S: ArtifactSource, D: PlatformDetector> Installer<R, S, D> {
    pub fn new(runtime: R, source: S, detector: D) -> Self {
        Self {
            runtime,
            source,
            detector,
        }
    }

    /// Run the whole pipeline. Any stage failure ends the run; nothing is
    /// written to the target path unless the digest matched and, when
    /// requested, the self-check passed.
    #[tracing::instrument(skip(self, table))]
    pub async fn run(
        &self,
        table: &ReleaseTable,
        request: &InstallRequest<'_>,
    ) -> Result<InstalledArtifact> {
        let key = self.detector.detect()?;
        println!(
            "   resolving {} {} for {}",
            table.name(),
            request.version,
            key
        );
        let entry = table.resolve(key, request.version)?;

        let cleanup_ctx = cleanup::new_shared();
        let cleanup_ctx_clone = Arc::clone(&cleanup_ctx);

        let ctrl_c_handler = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nInterrupted, cleaning up...");
                if let Ok(ctx) = cleanup_ctx_clone.lock() {
                    ctx.cleanup();
                }
                std::process::exit(130);
            }
        });

        let result = self.fetch_and_install(entry, request, &cleanup_ctx).await;

        ctrl_c_handler.abort();

        let installed = result?;

        println!(
            "   installed {} {} -> {}",
            table.name(),
            entry.version,
            installed.path.display()
        );
        Ok(installed)
    }

    async fn fetch_and_install(
        &self,
        entry: &ReleaseEntry,
        request: &InstallRequest<'_>,
        cleanup_ctx: &SharedCleanupContext,
    ) -> Result<InstalledArtifact> {
        println!(" downloading {}", entry.url);
        let data = fetch_artifact(&self.source, entry).await?;

        println!("   verifying {} {}", entry.algorithm, entry.expected_hash);
        verify_integrity(&data, entry)?;

        self.warn_on_platform_mismatch(&data, entry.platform);

        let target = request.target_dir.join(request.binary_name);
        println!("  installing {}", target.display());
        let path = install_binary_checked(
            &self.runtime,
            &data,
            request.target_dir,
            request.binary_name,
            cleanup_ctx,
            |candidate| {
                if request.self_check {
                    self.check_executable(candidate, &target)
                } else {
                    Ok(())
                }
            },
        )?;

        Ok(InstalledArtifact {
            path,
            mode: EXECUTABLE_MODE,
            entry: entry.clone(),
        })
    }

    /// Run an installed binary with `--help` and require a zero exit status.
    pub fn self_check(&self, installed: &InstalledArtifact) -> Result<()> {
        self.check_executable(&installed.path, &installed.path)
    }

    /// Run `program` with `--help`. Failures are reported against `target`,
    /// the path the binary is installed as.
    #[tracing::instrument(skip(self))]
    fn check_executable(&self, program: &Path, target: &Path) -> Result<()> {
        println!("    checking {} {}", target.display(), SELF_CHECK_FLAG);
        let output = self
            .runtime
            .run(program, &[SELF_CHECK_FLAG.to_string()])
            .map_err(|e| InstallerError::SelfCheckFailed {
                path: target.to_path_buf(),
                reason: format!("{:#}", e),
            })?;

        if output.success() {
            debug!("Self-check passed for {:?}", program);
            Ok(())
        } else {
            let status = match output.code {
                Some(code) => format!("exit status {}", code),
                None => "terminated by signal".to_string(),
            };
            let stderr = output.stderr.trim();
            let reason = if stderr.is_empty() {
                status
            } else {
                format!("{}: {}", status, stderr)
            };
            Err(InstallerError::SelfCheckFailed {
                path: target.to_path_buf(),
                reason,
            })
        }
    }

    fn warn_on_platform_mismatch(&self, data: &[u8], key: PlatformKey) {
        match artifact::platform_mismatch(data, key) {
            Some(reason) => warn!("Verified artifact may not run here: {}", reason),
            None => info!("Artifact header is compatible with {}", key),
        }
    }
}
