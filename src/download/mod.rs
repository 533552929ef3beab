use anyhow::Result;
use async_trait::async_trait;
use log::info;

use crate::error::InstallerError;
use crate::http::HttpClient;
use crate::release::ReleaseEntry;

/// Something that can hand back the bytes behind a release URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

#[async_trait]
impl ArtifactSource for HttpClient {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.fetch_bytes(url).await
    }
}

/// Downloads the artifact for `entry`. Nothing is written to disk.
#[tracing::instrument(skip(source, entry), fields(url = %entry.url))]
pub async fn fetch_artifact<S: ArtifactSource + ?Sized>(
    source: &S,
    entry: &ReleaseEntry,
) -> Result<Vec<u8>, InstallerError> {
    info!("Downloading {} from {}...", entry.file_name(), entry.url);

    let data = source
        .fetch(&entry.url)
        .await
        .map_err(|e| InstallerError::download(&entry.url, e))?;

    info!("Download complete ({} bytes).", data.len());
    Ok(data)
}
