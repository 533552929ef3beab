use anyhow::Result;
use log::debug;
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use std::path::PathBuf;
use std::time::Duration;

use crate::http::{HttpClient, RetryPolicy};
use crate::release::SD_LOCAL_BASE_URL;
use crate::runtime::Runtime;

use super::paths::resolve_bin_dir;

/// Default whole-request timeout for a download.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Settings as given on the command line; `None` means "use the default".
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    pub bin_dir: Option<PathBuf>,
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
    pub retries: Option<usize>,
}

/// Effective settings for one run.
pub struct Config {
    pub http_client: HttpClient,
    pub bin_dir: PathBuf,
    pub base_url: String,
}

impl Config {
    pub fn new<R: Runtime>(runtime: &R, options: ConfigOptions) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Ok(token) = runtime.env_var("GITHUB_TOKEN") {
            let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token))?;
            auth_value.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth_value);
            debug!("Using GITHUB_TOKEN for authentication: {}", mask_token(&token));
        }

        let timeout = options
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let client = Client::builder()
            .user_agent(concat!("sd-install/", env!("SD_INSTALL_VERSION")))
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        let retry = match options.retries {
            Some(attempts) => RetryPolicy {
                max_attempts: attempts.max(1),
                ..RetryPolicy::default()
            },
            None => RetryPolicy::default(),
        };

        let bin_dir = resolve_bin_dir(runtime, options.bin_dir)?;
        let base_url = options
            .base_url
            .unwrap_or_else(|| SD_LOCAL_BASE_URL.to_string());

        Ok(Self {
            http_client: HttpClient::new(client).with_retry_policy(retry),
            bin_dir,
            base_url,
        })
    }
}

fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "*********".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}
