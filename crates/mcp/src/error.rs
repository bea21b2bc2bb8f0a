// Errors surfaced to tool callers

use crate::tools::ValidationError;

/// Why a tool invocation failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    /// Arguments violated the tool's schema; no request was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No tool with this name is registered.
    #[error("Unknown tool: {0}")]
    NotFound(String),

    /// Reddit or the network failed. The message is already sanitized.
    #[error("{message}")]
    Upstream { message: String },

    /// Unexpected failure inside the server. The message is generic; details
    /// are only logged.
    #[error("{message}")]
    Internal { message: String },
}
