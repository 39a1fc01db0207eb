//! Profile page fetching from the mirror front-end

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::MirrorConfig;
use crate::error::{FetchError, Result};

/// Browser-like identification; some mirror instances refuse obvious bots
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Source of profile page markup for a monitored account
#[async_trait]
pub trait ProfileFetcher: Send + Sync {
    /// Fetch the raw profile listing page for an account handle
    async fn fetch_profile(&self, account: &str) -> Result<String>;
}

/// HTTP fetcher against a Nitter-style mirror instance
pub struct HttpFetcher {
    client: Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(config: &MirrorConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Strip surrounding whitespace and any leading "@" from a handle
pub fn normalize_handle(account: &str) -> &str {
    account.trim().trim_start_matches('@')
}

#[async_trait]
impl ProfileFetcher for HttpFetcher {
    async fn fetch_profile(&self, account: &str) -> Result<String> {
        let handle = normalize_handle(account);
        let url = format!("{}/{}", self.base_url, handle);
        debug!("Fetching profile page {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(categorize_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                code: status.as_u16(),
            }
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Other(format!("Failed to read response body: {}", e)))?;

        Ok(body)
    }
}

fn categorize_request_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_connect() {
        FetchError::ConnectionFailed(e.to_string())
    } else {
        FetchError::Other(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_handle_strips_at_and_whitespace() {
        assert_eq!(normalize_handle("@alice"), "alice");
        assert_eq!(normalize_handle("  bob  "), "bob");
        assert_eq!(normalize_handle(" @carol "), "carol");
        assert_eq!(normalize_handle("dave"), "dave");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let fetcher = HttpFetcher::new(&MirrorConfig {
            base_url: "https://nitter.example.com/".to_string(),
            timeout_secs: 30,
        });
        assert_eq!(fetcher.base_url, "https://nitter.example.com");
    }
}
