//! Decoding of Reddit's JSON "thing" envelopes into plain models.

use crate::error::{RedditError, RedditResult};
use crate::models::{Comment, Post, PostType, SubredditInfo};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Host used for permalinks, independent of the API base URL.
const PERMALINK_HOST: &str = "https://www.reddit.com";

const DELETED_AUTHOR: &str = "[deleted]";

/// A `{ "kind": ..., "data": ... }` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct Thing {
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Default, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
struct RawPost {
    id: String,
    #[serde(default)]
    title: String,
    author: Option<String>,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    subreddit: String,
    #[serde(default)]
    permalink: String,
    #[serde(default)]
    created_utc: f64,
    #[serde(default)]
    num_comments: u64,
    #[serde(default)]
    is_self: bool,
    #[serde(default)]
    is_gallery: bool,
    #[serde(default)]
    selftext: String,
    url: Option<String>,
    url_overridden_by_dest: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawComment {
    id: String,
    author: Option<String>,
    #[serde(default)]
    body: String,
    #[serde(default)]
    score: i64,
    /// Either `""` or a nested listing.
    #[serde(default)]
    replies: Value,
}

#[derive(Debug, Deserialize)]
struct RawSubreddit {
    display_name: String,
    subscribers: Option<u64>,
    public_description: Option<String>,
}

impl Thing {
    fn expect_kind(&self, kind: &str) -> RedditResult<()> {
        if self.kind == kind {
            Ok(())
        } else {
            Err(RedditError::Decode(format!(
                "expected kind '{}', got '{}'",
                kind, self.kind
            )))
        }
    }

    fn children(self) -> RedditResult<Vec<Thing>> {
        self.expect_kind("Listing")?;
        let listing: ListingData = serde_json::from_value(self.data)?;
        Ok(listing.children)
    }
}

/// Posts from a listing, in listing order, at most `limit` of them.
pub(crate) fn posts_from_listing(listing: Thing, limit: usize) -> RedditResult<Vec<Post>> {
    posts_from_children(listing.children()?, limit)
}

/// Like [`posts_from_listing`], but a subreddit search listing means the
/// subreddit does not exist.
pub(crate) fn subreddit_posts_from_listing(
    listing: Thing,
    name: &str,
    limit: usize,
) -> RedditResult<Vec<Post>> {
    let children = listing.children()?;
    if !children.is_empty() && children.iter().all(|child| child.kind == "t5") {
        return Err(RedditError::NotFound(format!("r/{}", name)));
    }
    posts_from_children(children, limit)
}

fn posts_from_children(children: Vec<Thing>, limit: usize) -> RedditResult<Vec<Post>> {
    children
        .into_iter()
        .filter(|child| child.kind == "t3")
        .take(limit)
        .map(|child| -> RedditResult<Post> {
            Ok(build_post(serde_json::from_value(child.data)?))
        })
        .collect()
}

/// Top-level comments from a listing, at most `limit`, each with replies cut
/// at `depth` levels (the comment itself counts as one).
pub(crate) fn comments_from_listing(
    listing: Thing,
    limit: usize,
    depth: u32,
) -> RedditResult<Vec<Comment>> {
    let mut comments = build_comment_level(listing, depth)?;
    comments.truncate(limit);
    Ok(comments)
}

pub(crate) fn subreddit_from_thing(thing: Thing, name: &str) -> RedditResult<SubredditInfo> {
    // Unknown subreddits are answered with a search listing rather than a 404.
    if thing.kind != "t5" {
        return Err(RedditError::NotFound(format!("r/{}", name)));
    }
    let raw: RawSubreddit = serde_json::from_value(thing.data)?;
    Ok(SubredditInfo {
        name: raw.display_name,
        subscriber_count: raw.subscribers.unwrap_or(0),
        description: raw.public_description.filter(|d| !d.is_empty()),
    })
}

fn build_comment_level(listing: Thing, depth: u32) -> RedditResult<Vec<Comment>> {
    if depth == 0 {
        return Ok(Vec::new());
    }
    listing
        .children()?
        .into_iter()
        // "more" placeholders need another round-trip; skip them.
        .filter(|child| child.kind == "t1")
        .map(|child| build_comment(serde_json::from_value(child.data)?, depth))
        .collect()
}

fn build_comment(raw: RawComment, depth: u32) -> RedditResult<Comment> {
    let replies = match raw.replies {
        Value::Object(_) if depth > 1 => {
            let listing: Thing = serde_json::from_value(raw.replies)?;
            build_comment_level(listing, depth - 1)?
        }
        _ => Vec::new(),
    };

    Ok(Comment {
        id: raw.id,
        author: normalize_author(raw.author),
        body: raw.body,
        score: raw.score,
        replies,
    })
}

fn build_post(raw: RawPost) -> Post {
    let link = raw
        .url_overridden_by_dest
        .or(raw.url)
        .filter(|u| !u.is_empty());

    let (post_type, content) = if raw.is_gallery {
        (PostType::Gallery, link)
    } else if raw.is_self {
        (PostType::Text, Some(raw.selftext))
    } else if link.is_some() {
        (PostType::Link, link)
    } else {
        (PostType::Unknown, None)
    };

    let created_at = DateTime::<Utc>::from_timestamp(raw.created_utc as i64, 0)
        .unwrap_or_default()
        .to_rfc3339();

    Post {
        id: raw.id,
        title: raw.title,
        author: normalize_author(raw.author),
        score: raw.score,
        subreddit: raw.subreddit,
        url: format!("{}{}", PERMALINK_HOST, raw.permalink),
        created_at,
        comment_count: raw.num_comments,
        post_type,
        content,
    }
}

fn normalize_author(author: Option<String>) -> String {
    author
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| DELETED_AUTHOR.to_string())
}
