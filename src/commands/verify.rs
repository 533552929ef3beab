use anyhow::{Context, Result};
use log::warn;
use std::path::Path;

use crate::{
    artifact, platform::PlatformDetector, release::ReleaseTable, runtime::Runtime,
};

/// Check a file that is already on disk against the table entry for the platform.
#[tracing::instrument(skip(runtime, table, detector))]
pub fn verify<R: Runtime, D: PlatformDetector>(
    runtime: &R,
    table: &ReleaseTable,
    detector: &D,
    file: &Path,
    version: &str,
) -> Result<()> {
    let key = detector.detect()?;
    let entry = table.resolve(key, version)?;

    println!(
        "   verifying {} against {} {} for {}",
        file.display(),
        table.name(),
        entry.version,
        key
    );
    let data = runtime
        .read(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    entry.verify(&data)?;

    if let Some(reason) = artifact::platform_mismatch(&data, key) {
        warn!("{}", reason);
    }

    println!(
        "          ok {} ({} bytes, {} {})",
        file.display(),
        data.len(),
        entry.algorithm,
        entry.expected_hash
    );
    Ok(())
}
