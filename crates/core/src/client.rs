//! HTTP client for Reddit's public JSON API.

use crate::config::RedditConfig;
use crate::error::{RedditError, RedditResult};
use crate::listing::{self, Thing};
use crate::models::{Comment, Post, PostDetail, SortMode, SubredditInfo, TimeFilter};
use async_trait::async_trait;
use reqwest::{header, redirect, Client};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

/// Reply depth used when only comments are requested.
pub const DEFAULT_COMMENT_DEPTH: u32 = 3;

/// Read operations the tool layer needs from Reddit.
///
/// Each call performs exactly one upstream request.
#[async_trait]
pub trait RedditApi: Send + Sync {
    /// Hot posts from the frontpage.
    async fn frontpage_posts(&self, limit: u32) -> RedditResult<Vec<Post>>;

    /// Name, subscriber count and description of a subreddit.
    async fn subreddit_info(&self, subreddit: &str) -> RedditResult<SubredditInfo>;

    /// Posts from a subreddit in the given order. `time_filter` only
    /// applies to [`SortMode::Top`].
    async fn subreddit_posts(
        &self,
        subreddit: &str,
        sort: SortMode,
        limit: u32,
        time_filter: Option<TimeFilter>,
    ) -> RedditResult<Vec<Post>>;

    /// A post with its top comments.
    async fn post_detail(
        &self,
        post_id: &str,
        comment_limit: u32,
        comment_depth: u32,
    ) -> RedditResult<PostDetail>;

    /// Top comments of a post.
    async fn post_comments(&self, post_id: &str, limit: u32) -> RedditResult<Vec<Comment>>;
}

/// Unauthenticated Reddit client.
#[derive(Debug, Clone)]
pub struct RedditClient {
    http: Client,
    base_url: Url,
}

impl RedditClient {
    /// Create a new client with the given configuration.
    pub fn new(config: &RedditConfig) -> RedditResult<Self> {
        config.validate()?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .default_headers(headers)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            http,
            base_url: config.parsed_base_url()?,
        })
    }

    fn build_url(&self, path: &str) -> RedditResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// GET a JSON document. `raw_json=1` keeps Reddit from HTML-escaping text.
    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> RedditResult<T> {
        let url = self.build_url(path)?;
        debug!(url = %url, "GET request");

        let response = self
            .http
            .get(url)
            .query(query)
            .query(&[("raw_json", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let body = response.text().await.unwrap_or_default();
            let err = RedditError::from_response(status.as_u16(), path, &headers, &body);
            warn!(status = status.as_u16(), path = %path, error = %err, "Reddit request failed");
            return Err(err);
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn comment_tree(
        &self,
        post_id: &str,
        limit: u32,
        depth: u32,
    ) -> RedditResult<(Thing, Thing)> {
        let path = format!("comments/{}.json", post_id);
        let query = [
            ("limit", limit.to_string()),
            ("depth", depth.to_string()),
            ("sort", "top".to_string()),
        ];
        let things: Vec<Thing> = self.get(&path, &query).await?;

        let mut things = things.into_iter();
        match (things.next(), things.next()) {
            (Some(post), Some(comments)) => Ok((post, comments)),
            _ => Err(RedditError::Decode(format!(
                "comment response for '{}' is not a [post, comments] pair",
                post_id
            ))),
        }
    }
}

#[async_trait]
impl RedditApi for RedditClient {
    async fn frontpage_posts(&self, limit: u32) -> RedditResult<Vec<Post>> {
        let listing: Thing = self.get("hot.json", &[("limit", limit.to_string())]).await?;
        listing::posts_from_listing(listing, limit as usize)
    }

    async fn subreddit_info(&self, subreddit: &str) -> RedditResult<SubredditInfo> {
        let path = format!("r/{}/about.json", subreddit);
        let thing: Thing = self.get(&path, &[]).await?;
        listing::subreddit_from_thing(thing, subreddit)
    }

    async fn subreddit_posts(
        &self,
        subreddit: &str,
        sort: SortMode,
        limit: u32,
        time_filter: Option<TimeFilter>,
    ) -> RedditResult<Vec<Post>> {
        let path = format!("r/{}/{}.json", subreddit, sort);
        let mut query = vec![("limit", limit.to_string())];
        if let (SortMode::Top, Some(filter)) = (sort, time_filter) {
            query.push(("t", filter.to_string()));
        }

        let listing: Thing = self.get(&path, &query).await?;
        listing::subreddit_posts_from_listing(listing, subreddit, limit as usize)
    }

    async fn post_detail(
        &self,
        post_id: &str,
        comment_limit: u32,
        comment_depth: u32,
    ) -> RedditResult<PostDetail> {
        let (post_listing, comment_listing) = self
            .comment_tree(post_id, comment_limit, comment_depth)
            .await?;

        let post = listing::posts_from_listing(post_listing, 1)?
            .into_iter()
            .next()
            .ok_or_else(|| RedditError::NotFound(format!("post {}", post_id)))?;
        let comments = listing::comments_from_listing(
            comment_listing,
            comment_limit as usize,
            comment_depth,
        )?;

        Ok(PostDetail { post, comments })
    }

    async fn post_comments(&self, post_id: &str, limit: u32) -> RedditResult<Vec<Comment>> {
        let (_, comment_listing) = self
            .comment_tree(post_id, limit, DEFAULT_COMMENT_DEPTH)
            .await?;
        listing::comments_from_listing(comment_listing, limit as usize, DEFAULT_COMMENT_DEPTH)
    }
}
