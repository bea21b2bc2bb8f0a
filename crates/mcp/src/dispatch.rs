// Tool dispatch: lookup, validation, invocation and result serialization

use crate::error::ToolError;
use crate::protocol::ToolSchema;
use crate::tools::{RedditTool, ToolCall};
use reddit_mcp_core::{RedditApi, RedditError, RedditResult};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Routes tool calls to the Reddit adapter.
#[derive(Clone)]
pub struct ToolDispatcher {
    reddit: Arc<dyn RedditApi>,
}

impl ToolDispatcher {
    pub fn new(reddit: Arc<dyn RedditApi>) -> Self {
        Self { reddit }
    }

    /// Schemas of every tool, in advertised order.
    pub fn list_schemas(&self) -> Vec<ToolSchema> {
        RedditTool::ALL.iter().map(|tool| tool.schema()).collect()
    }

    /// Invoke a tool by name with raw caller arguments.
    ///
    /// Validation happens before any request is sent, and each call reaches
    /// Reddit at most once.
    pub async fn invoke(
        &self,
        tool_name: &str,
        arguments: &serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        let tool: RedditTool = tool_name.parse()?;
        let call = tool.parse_arguments(arguments)?;
        debug!(tool = %tool, ?call, "Invoking tool");
        self.execute(tool, call).await
    }

    /// Run an already validated call.
    pub async fn execute(
        &self,
        tool: RedditTool,
        call: ToolCall,
    ) -> Result<serde_json::Value, ToolError> {
        let what = call.describe();
        let result = match call {
            ToolCall::FrontpagePosts { limit } => to_json(self.reddit.frontpage_posts(limit).await),
            ToolCall::SubredditInfo { subreddit } => {
                to_json(self.reddit.subreddit_info(&subreddit).await)
            }
            ToolCall::SubredditPosts {
                subreddit,
                sort,
                limit,
                time_filter,
            } => to_json(
                self.reddit
                    .subreddit_posts(&subreddit, sort, limit, time_filter)
                    .await,
            ),
            ToolCall::PostContent {
                post_id,
                comment_limit,
                comment_depth,
            } => to_json(
                self.reddit
                    .post_detail(&post_id, comment_limit, comment_depth)
                    .await,
            ),
            ToolCall::PostComments { post_id, limit } => {
                to_json(self.reddit.post_comments(&post_id, limit).await)
            }
        };

        result.map_err(|err| classify(tool, &what, err))
    }
}

enum Failure {
    Reddit(RedditError),
    Serialize(serde_json::Error),
}

fn to_json<T: Serialize>(result: RedditResult<T>) -> Result<serde_json::Value, Failure> {
    let value = result.map_err(Failure::Reddit)?;
    serde_json::to_value(value).map_err(Failure::Serialize)
}

/// Turn a handler failure into a caller-facing error, logging the detail.
fn classify(tool: RedditTool, what: &str, failure: Failure) -> ToolError {
    match failure {
        Failure::Reddit(err) if err.is_upstream() => {
            warn!(tool = %tool, error = %err, "Reddit request failed");
            ToolError::Upstream {
                message: format!("Failed to fetch {}: {}", what, err.summary()),
            }
        }
        Failure::Reddit(err) => {
            error!(tool = %tool, error = %err, "Tool failed");
            internal(tool)
        }
        Failure::Serialize(err) => {
            error!(tool = %tool, error = %err, "Failed to serialize tool result");
            internal(tool)
        }
    }
}

fn internal(tool: RedditTool) -> ToolError {
    ToolError::Internal {
        message: format!("Internal error while running {}", tool),
    }
}
