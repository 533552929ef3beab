use anyhow::anyhow;
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cleanup::{CleanupGuard, SharedCleanupContext};
use crate::error::{InstallerError, Result};
use crate::runtime::Runtime;

/// Permission bits of an installed binary.
pub const EXECUTABLE_MODE: u32 = 0o755;

/// Temp file next to the target, so the final rename stays on one filesystem.
pub fn temp_path_for(target_dir: &Path, binary_name: &str) -> PathBuf {
    target_dir.join(format!(".{}.{}.tmp", binary_name, std::process::id()))
}

/// Write `data` to `target_dir/binary_name` as an executable.
///
/// The bytes go to a temp file in `target_dir`, are synced to disk, made
/// executable and then renamed over the target. The target path therefore
/// holds either the previous file or the complete new one. The temp file is
/// removed on every failure path.
pub fn install_binary<R: Runtime>(
    runtime: &R,
    data: &[u8],
    target_dir: &Path,
    binary_name: &str,
    cleanup_ctx: &SharedCleanupContext,
) -> Result<PathBuf> {
    install_binary_checked(runtime, data, target_dir, binary_name, cleanup_ctx, |_| Ok(()))
}

/// Like [`install_binary`], but runs `check` on the executable temp file
/// before the rename. A failed check leaves the target untouched.
#[tracing::instrument(skip(runtime, data, cleanup_ctx, check), fields(len = data.len()))]
pub fn install_binary_checked<R, F>(
    runtime: &R,
    data: &[u8],
    target_dir: &Path,
    binary_name: &str,
    cleanup_ctx: &SharedCleanupContext,
    check: F,
) -> Result<PathBuf>
where
    R: Runtime,
    F: FnOnce(&Path) -> Result<()>,
{
    let target = target_dir.join(binary_name);
    validate_binary_name(binary_name).map_err(|e| InstallerError::install(&target, e))?;

    runtime
        .create_dir_all(target_dir)
        .map_err(|e| InstallerError::install(&target, e))?;

    if runtime.is_dir(&target) {
        return Err(InstallerError::install(
            &target,
            anyhow!("target path is a directory"),
        ));
    }

    let guard = CleanupGuard::new(
        runtime,
        Arc::clone(cleanup_ctx),
        temp_path_for(target_dir, binary_name),
    );
    debug!("Writing {} bytes to {:?}", data.len(), guard.path());

    runtime
        .write_synced(guard.path(), data)
        .map_err(|e| InstallerError::install(&target, e))?;
    runtime
        .set_permissions(guard.path(), EXECUTABLE_MODE)
        .map_err(|e| InstallerError::install(&target, e))?;

    check(guard.path())?;

    runtime
        .rename(guard.path(), &target)
        .map_err(|e| InstallerError::install(&target, e))?;

    guard.success();
    debug!("Installed {:?}", target);
    Ok(target)
}

fn validate_binary_name(name: &str) -> anyhow::Result<()> {
    if name.is_empty() || name == "." || name == ".." {
        anyhow::bail!("invalid binary name '{}'", name);
    }
    if name.contains('/') || name.contains('\\') {
        anyhow::bail!("binary name '{}' must not contain a path separator", name);
    }
    Ok(())
}
