//! # Reddit MCP Core
//!
//! Read-only adapter over Reddit's public JSON API. Every operation makes a
//! single unauthenticated request and shapes the response into the plain
//! models in [`models`].
//!
//! ```rust,no_run
//! use reddit_mcp_core::{RedditApi, RedditClient, RedditConfig, SortMode};
//!
//! # async fn example() -> reddit_mcp_core::RedditResult<()> {
//! let client = RedditClient::new(&RedditConfig::default())?;
//! let posts = client.subreddit_posts("rust", SortMode::Hot, 5, None).await?;
//! for post in posts {
//!     println!("{} ({})", post.title, post.score);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
mod listing;
pub mod models;

pub use client::{RedditApi, RedditClient, DEFAULT_COMMENT_DEPTH};
pub use config::{RedditConfig, DEFAULT_BASE_URL};
pub use error::{RedditError, RedditResult};
pub use models::*;
