use anyhow::Result;

use crate::{platform::PlatformDetector, release::SD_LOCAL_VERSION};

/// Installer version, from `git describe` at build time.
pub const VERSION: &str = env!("SD_INSTALL_VERSION");

pub fn version<D: PlatformDetector>(detector: &D) -> Result<()> {
    println!("{}", describe(detector));
    Ok(())
}

fn describe<D: PlatformDetector>(detector: &D) -> String {
    let platform = match detector.detect() {
        Ok(key) => key.to_string(),
        Err(e) => format!("unsupported ({})", e),
    };
    format!(
        "sd-install {}\nplatform: {}\nsd-local: {}",
        VERSION, platform, SD_LOCAL_VERSION
    )
}
