// MCP (Model Context Protocol) server exposing Reddit's public read API as tools

pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod server;
pub mod tools;

pub use dispatch::ToolDispatcher;
pub use error::ToolError;
pub use server::McpServer;
pub use tools::{RedditTool, ToolCall, ValidationError};
