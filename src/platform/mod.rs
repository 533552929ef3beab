//! Platform detection
//!
//! This module classifies the host (OS and architecture) into a
//! [`PlatformKey`], the key used to select a release artifact.

mod detection;

pub use detection::{Arch, HostDetector, Os, PlatformDetector, PlatformKey};

#[cfg(test)]
pub use detection::MockPlatformDetector;
