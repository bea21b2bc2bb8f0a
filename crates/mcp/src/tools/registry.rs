// Static table of the Reddit tools

use crate::error::ToolError;
use crate::protocol::ToolSchema;
use crate::tools::args::{
    self, Arguments, IntParam, ValidationError, COMMENT_LIMIT, DETAIL_COMMENT_DEPTH,
    DETAIL_COMMENT_LIMIT, POST_ID, POST_LIMIT, SUBREDDIT_NAME, TIME_FILTER,
};
use reddit_mcp_core::{SortMode, TimeFilter};
use std::fmt;
use std::str::FromStr;

/// Every tool this server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedditTool {
    FrontpagePosts,
    SubredditInfo,
    SubredditHotPosts,
    SubredditNewPosts,
    SubredditTopPosts,
    SubredditRisingPosts,
    PostContent,
    PostComments,
}

/// A tool call whose arguments passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    FrontpagePosts {
        limit: u32,
    },
    SubredditInfo {
        subreddit: String,
    },
    SubredditPosts {
        subreddit: String,
        sort: SortMode,
        limit: u32,
        time_filter: Option<TimeFilter>,
    },
    PostContent {
        post_id: String,
        comment_limit: u32,
        comment_depth: u32,
    },
    PostComments {
        post_id: String,
        limit: u32,
    },
}

impl RedditTool {
    /// Order in which tools are advertised.
    pub const ALL: [RedditTool; 8] = [
        Self::FrontpagePosts,
        Self::SubredditInfo,
        Self::SubredditHotPosts,
        Self::SubredditNewPosts,
        Self::SubredditTopPosts,
        Self::SubredditRisingPosts,
        Self::PostContent,
        Self::PostComments,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::FrontpagePosts => "get_frontpage_posts",
            Self::SubredditInfo => "get_subreddit_info",
            Self::SubredditHotPosts => "get_subreddit_hot_posts",
            Self::SubredditNewPosts => "get_subreddit_new_posts",
            Self::SubredditTopPosts => "get_subreddit_top_posts",
            Self::SubredditRisingPosts => "get_subreddit_rising_posts",
            Self::PostContent => "get_post_content",
            Self::PostComments => "get_post_comments",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::FrontpagePosts => {
                "Get hot posts from the Reddit frontpage, with title, author, score and more"
            }
            Self::SubredditInfo => {
                "Get basic information about a subreddit: name, subscriber count and description"
            }
            Self::SubredditHotPosts => "Get hot posts from a specific subreddit",
            Self::SubredditNewPosts => "Get new posts from a specific subreddit",
            Self::SubredditTopPosts => {
                "Get top posts from a specific subreddit, optionally within a time window"
            }
            Self::SubredditRisingPosts => "Get rising posts from a specific subreddit",
            Self::PostContent => "Get detailed post content including its nested comments",
            Self::PostComments => "Get the top comments of a post, with nested replies",
        }
    }

    /// Input schema advertised through tools/list.
    pub fn schema(&self) -> ToolSchema {
        let int = |param: &IntParam| (param.name, param.schema());

        let (properties, required): (Vec<(&str, serde_json::Value)>, Vec<&str>) = match self {
            Self::FrontpagePosts => (vec![int(&POST_LIMIT)], vec![]),
            Self::SubredditInfo => (
                vec![(SUBREDDIT_NAME, args::subreddit_name_schema())],
                vec![SUBREDDIT_NAME],
            ),
            Self::SubredditTopPosts => (
                vec![
                    (SUBREDDIT_NAME, args::subreddit_name_schema()),
                    int(&POST_LIMIT),
                    (TIME_FILTER, args::time_filter_schema()),
                ],
                vec![SUBREDDIT_NAME],
            ),
            Self::SubredditHotPosts | Self::SubredditNewPosts | Self::SubredditRisingPosts => (
                vec![
                    (SUBREDDIT_NAME, args::subreddit_name_schema()),
                    int(&POST_LIMIT),
                ],
                vec![SUBREDDIT_NAME],
            ),
            Self::PostContent => (
                vec![
                    (POST_ID, args::post_id_schema()),
                    int(&DETAIL_COMMENT_LIMIT),
                    int(&DETAIL_COMMENT_DEPTH),
                ],
                vec![POST_ID],
            ),
            Self::PostComments => (
                vec![(POST_ID, args::post_id_schema()), int(&COMMENT_LIMIT)],
                vec![POST_ID],
            ),
        };

        let properties: serde_json::Map<String, serde_json::Value> = properties
            .into_iter()
            .map(|(name, schema)| (name.to_string(), schema))
            .collect();

        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: super::json_schema_object(serde_json::Value::Object(properties), required),
        }
    }

    /// Check raw arguments against this tool's schema.
    pub fn parse_arguments(&self, raw: &serde_json::Value) -> Result<ToolCall, ValidationError> {
        let args = Arguments::from_value(raw)?;

        let call = match self {
            Self::FrontpagePosts => ToolCall::FrontpagePosts {
                limit: POST_LIMIT.read(&args)?,
            },
            Self::SubredditInfo => ToolCall::SubredditInfo {
                subreddit: args::read_subreddit_name(&args)?,
            },
            Self::SubredditHotPosts => listing_call(&args, SortMode::Hot)?,
            Self::SubredditNewPosts => listing_call(&args, SortMode::New)?,
            Self::SubredditTopPosts => listing_call(&args, SortMode::Top)?,
            Self::SubredditRisingPosts => listing_call(&args, SortMode::Rising)?,
            Self::PostContent => ToolCall::PostContent {
                post_id: args::read_post_id(&args)?,
                comment_limit: DETAIL_COMMENT_LIMIT.read(&args)?,
                comment_depth: DETAIL_COMMENT_DEPTH.read(&args)?,
            },
            Self::PostComments => ToolCall::PostComments {
                post_id: args::read_post_id(&args)?,
                limit: COMMENT_LIMIT.read(&args)?,
            },
        };

        Ok(call)
    }
}

impl fmt::Display for RedditTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn listing_call(args: &Arguments, sort: SortMode) -> Result<ToolCall, ValidationError> {
    Ok(ToolCall::SubredditPosts {
        subreddit: args::read_subreddit_name(args)?,
        sort,
        limit: POST_LIMIT.read(args)?,
        time_filter: match sort {
            SortMode::Top => args::read_time_filter(args)?,
            _ => None,
        },
    })
}

impl FromStr for RedditTool {
    type Err = ToolError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|tool| tool.name() == name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))
    }
}

impl ToolCall {
    /// What the call fetches, for error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::FrontpagePosts { .. } => "frontpage posts".to_string(),
            Self::SubredditInfo { subreddit } => format!("subreddit info for '{}'", subreddit),
            Self::SubredditPosts {
                subreddit, sort, ..
            } => format!("{} posts from '{}'", sort, subreddit),
            Self::PostContent { post_id, .. } => format!("post content for '{}'", post_id),
            Self::PostComments { post_id, .. } => format!("comments for post '{}'", post_id),
        }
    }
}
