//! Error types for the Reddit adapter.

use reqwest::header::HeaderMap;

/// Result type for Reddit adapter operations.
pub type RedditResult<T> = Result<T, RedditError>;

/// Errors that can occur while talking to the Reddit API.
#[derive(Debug, thiserror::Error)]
pub enum RedditError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Subreddit or post does not exist.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Subreddit is private, quarantined or banned.
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// Rate limited by Reddit.
    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Reddit answered with another non-success status.
    #[error("Reddit API error (status {status}): {message}")]
    Status { status: u16, message: String },

    /// Response body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl RedditError {
    /// Whether the error originates from Reddit or the network rather than
    /// from this process.
    pub fn is_upstream(&self) -> bool {
        !matches!(self, Self::Config(_) | Self::InvalidUrl(_))
    }

    /// Short description that is safe to hand back to a tool caller.
    ///
    /// Never includes URLs, headers or raw response bodies.
    pub fn summary(&self) -> String {
        match self {
            Self::Http(e) if e.is_timeout() => "request to Reddit timed out".to_string(),
            Self::Http(_) => "could not reach Reddit".to_string(),
            Self::NotFound(_) => "subreddit or post not found".to_string(),
            Self::Forbidden(_) => "access forbidden (private, quarantined or banned)".to_string(),
            Self::RateLimited {
                retry_after_secs: Some(secs),
            } => format!("rate limited by Reddit, retry after {} seconds", secs),
            Self::RateLimited { .. } => "rate limited by Reddit, try again later".to_string(),
            Self::Status { status, .. } => format!("Reddit returned HTTP {}", status),
            Self::Decode(_) | Self::Json(_) => "unexpected response from Reddit".to_string(),
            Self::Config(_) | Self::InvalidUrl(_) => "internal configuration error".to_string(),
        }
    }

    /// Map a non-success HTTP response onto an error.
    pub fn from_response(status: u16, resource: &str, headers: &HeaderMap, body: &str) -> Self {
        match status {
            // Unknown subreddits are redirected to a subreddit search.
            300..=399 | 404 => Self::NotFound(resource.to_string()),
            403 => Self::Forbidden(resource.to_string()),
            429 => Self::RateLimited {
                retry_after_secs: retry_after(headers),
            },
            _ => Self::Status {
                status,
                message: body.chars().take(200).collect(),
            },
        }
    }
}

/// Seconds until the rate-limit window resets, from `Retry-After` or
/// Reddit's `x-ratelimit-reset` (which may be fractional).
fn retry_after(headers: &HeaderMap) -> Option<u64> {
    ["retry-after", "x-ratelimit-reset"]
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.trim().parse::<f64>().ok())
        .find(|secs| secs.is_finite() && *secs >= 0.0)
        .map(|secs| secs.ceil() as u64)
}
