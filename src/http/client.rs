//! HTTP client with bounded retry for release downloads.

use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::Client;

use super::retry::{NonRetryableError, RetryPolicy, check_retryable};

/// Largest response body accepted by [`HttpClient::fetch_bytes`].
pub const MAX_BODY_BYTES: u64 = 512 * 1024 * 1024;

/// HTTP client with built-in retry logic for network operations.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    retry: RetryPolicy,
    max_body: u64,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client with the default retry policy.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            retry: RetryPolicy::default(),
            max_body: MAX_BODY_BYTES,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_body_size(mut self, bytes: u64) -> Self {
        self.max_body = bytes;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Downloads the whole body at `url` into memory.
    /// Retries on transient errors and on truncated transfers.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("Downloading {}...", url);
        self.with_retry("Download", || self.fetch_bytes_once(url))
            .await
    }

    /// Single download attempt without retry.
    async fn fetch_bytes_once(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to start download request")?;

        let mut response = response.error_for_status().map_err(check_retryable)?;

        // hyper already fails the read when the body is shorter than Content-Length
        let expected_len = response.content_length();
        if let Some(len) = expected_len {
            if len > self.max_body {
                return Err(self.too_large(len));
            }
        }
        let mut body = Vec::with_capacity(expected_len.unwrap_or(0) as usize);

        while let Some(chunk) = response
            .chunk()
            .await
            .context("Failed to read chunk from download stream")?
        {
            let received = (body.len() + chunk.len()) as u64;
            if received > self.max_body {
                return Err(self.too_large(received));
            }
            body.extend_from_slice(&chunk);
        }

        debug!(
            "Downloaded {:.2} MB",
            body.len() as f64 / (1024.0 * 1024.0)
        );

        Ok(body)
    }

    fn too_large(&self, len: u64) -> anyhow::Error {
        anyhow::Error::from(NonRetryableError::TooLarge(format!(
            "{} bytes exceeds the limit of {} bytes",
            len, self.max_body
        )))
    }

    /// Executes an async operation with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation_name: &str, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let max_attempts = self.retry.max_attempts;
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !is_retryable_error(&e) {
                        debug!("{}: non-retryable error: {}", operation_name, e);
                        return Err(e);
                    }

                    if attempt < max_attempts {
                        let delay = self.retry.delay_after(attempt);
                        warn!(
                            "{}: attempt {}/{} failed ({:#}), retrying in {}ms...",
                            operation_name,
                            attempt,
                            max_attempts,
                            e,
                            delay.as_millis()
                        );
                        tokio::time::sleep(delay).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            anyhow::anyhow!("{}: failed after {} attempts", operation_name, max_attempts)
        }))
    }
}

fn is_retryable_error(e: &anyhow::Error) -> bool {
    e.downcast_ref::<NonRetryableError>().is_none()
}
