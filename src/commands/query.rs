use anyhow::Result;

use crate::{
    platform::PlatformDetector,
    release::{ReleaseEntry, ReleaseTable},
};

/// Print the entry that `install` would use, without downloading it.
#[tracing::instrument(skip(table, detector))]
pub fn resolve<D: PlatformDetector>(
    table: &ReleaseTable,
    detector: &D,
    version: &str,
    json: bool,
) -> Result<()> {
    let key = detector.detect()?;
    let entry = table.resolve(key, version)?;
    println!("{}", format_entry(table.name(), entry, json)?);
    Ok(())
}

/// Print every entry of the table.
pub fn platforms(table: &ReleaseTable, json: bool) -> Result<()> {
    println!("{}", format_table(table, json)?);
    Ok(())
}

fn format_entry(name: &str, entry: &ReleaseEntry, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(entry)?);
    }
    Ok(format!(
        "{} {} for {}\n  url:    {}\n  sha256: {}",
        name, entry.version, entry.platform, entry.url, entry.expected_hash
    ))
}

fn format_table(table: &ReleaseTable, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(table)?);
    }
    let lines: Vec<String> = table
        .entries()
        .iter()
        .map(|entry| {
            format!(
                "{:<14} {:<8} {}  {}",
                entry.platform.to_string(),
                entry.version,
                entry.expected_hash,
                entry.url
            )
        })
        .collect();
    Ok(lines.join("\n"))
}
