//! Configuration for the Reddit client.

use crate::error::{RedditError, RedditResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Public Reddit host serving the unauthenticated JSON API.
pub const DEFAULT_BASE_URL: &str = "https://www.reddit.com";

/// Configuration for [`RedditClient`](crate::RedditClient).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RedditConfig {
    /// Base URL of the Reddit API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User-Agent header sent with every request. Reddit throttles
    /// generic agents aggressively.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    format!("reddit-mcp/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RedditConfig {
    /// Create a configuration pointing at the given base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Parsed base URL, always ending in `/` so that relative joins keep
    /// any path prefix.
    pub fn parsed_base_url(&self) -> RedditResult<Url> {
        let mut url = Url::parse(&self.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(RedditError::Config(format!(
                "base_url must be http or https, got: {}",
                url.scheme()
            )));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the configuration before building a client.
    pub fn validate(&self) -> RedditResult<()> {
        self.parsed_base_url()?;
        if self.user_agent.trim().is_empty() {
            return Err(RedditError::Config("user_agent must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(RedditError::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
