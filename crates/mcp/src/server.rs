// MCP server: JSON-RPC method handling and the stdio loop

use crate::dispatch::ToolDispatcher;
use crate::error::ToolError;
use crate::protocol::{
    negotiate_protocol_version, CallToolParams, CallToolResult, InitializeParams,
    InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse, ListToolsResult,
    ServerCapabilities, ServerInfo, ToolsCapability, JSONRPC_VERSION,
};
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

pub const SERVER_NAME: &str = "reddit-mcp";

const INSTRUCTIONS: &str = "Read-only access to Reddit's public API: frontpage and subreddit \
listings, subreddit info, and post content with comment trees.";

/// Transport-independent MCP request handler.
#[derive(Clone)]
pub struct McpServer {
    dispatcher: ToolDispatcher,
}

impl McpServer {
    pub fn new(dispatcher: ToolDispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn server_info() -> ServerInfo {
        ServerInfo {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Handle one raw JSON-RPC message. Returns `None` for notifications.
    pub async fn handle_message(&self, raw: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Failed to parse JSON-RPC message");
                return Some(JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error()));
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Malformed JSON-RPC request");
                return Some(JsonRpcResponse::error(id, JsonRpcError::invalid_request()));
            }
        };

        self.handle_request(request).await
    }

    /// Handle a decoded request. Returns `None` for notifications.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                request.id.unwrap_or(Value::Null),
                JsonRpcError::invalid_request(),
            ));
        }

        if request.is_notification() {
            self.handle_notification(&request.method);
            return None;
        }
        let id = request.id.unwrap_or(Value::Null);

        debug!(method = %request.method, "Handling request");
        let params = request.params.unwrap_or(Value::Null);
        let outcome = match request.method.as_str() {
            "initialize" => self.initialize(params),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => to_result(ListToolsResult {
                tools: self.dispatcher.list_schemas(),
            }),
            "tools/call" => self.call_tool(params).await,
            other => Err(JsonRpcError::method_not_found(other)),
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::error(id, error),
        })
    }

    fn handle_notification(&self, method: &str) {
        match method {
            "notifications/initialized" => info!("Client initialized"),
            "notifications/cancelled" => debug!("Client cancelled a request"),
            other => debug!(method = %other, "Ignoring notification"),
        }
    }

    fn initialize(&self, params: Value) -> Result<Value, JsonRpcError> {
        let params: InitializeParams = if params.is_null() {
            InitializeParams::default()
        } else {
            serde_json::from_value(params)
                .map_err(|e| JsonRpcError::invalid_params(format!("Invalid initialize params: {}", e)))?
        };

        if let Some(client) = &params.client_info {
            info!(client = %client.name, version = %client.version, "Client connected");
        }

        to_result(InitializeResult {
            protocol_version: negotiate_protocol_version(params.protocol_version.as_deref()),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: Self::server_info(),
            instructions: Some(INSTRUCTIONS.to_string()),
        })
    }

    async fn call_tool(&self, params: Value) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = serde_json::from_value(params)
            .map_err(|e| JsonRpcError::invalid_params(format!("Invalid tools/call params: {}", e)))?;

        info!(tool = %params.name, "Tool call");
        let result = match self.dispatcher.invoke(&params.name, &params.arguments).await {
            Ok(value) => CallToolResult::json(value),
            Err(ToolError::NotFound(name)) => {
                return Err(JsonRpcError::invalid_params(format!("Unknown tool: {}", name)))
            }
            Err(err) => {
                debug!(tool = %params.name, error = %err, "Tool call failed");
                CallToolResult::error(err.to_string())
            }
        };

        to_result(result)
    }

    /// Serve newline-delimited JSON-RPC until the reader is exhausted.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .await
                .context("Failed to read from input")?;
            if read == 0 {
                break;
            }

            let response = match std::str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.handle_message(line.trim_end()).await,
                Err(e) => {
                    warn!(error = %e, "Input line is not valid UTF-8");
                    Some(JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error()))
                }
            };

            if let Some(response) = response {
                let mut payload = serde_json::to_vec(&response)
                    .context("Failed to serialize JSON-RPC response")?;
                payload.push(b'\n');
                writer
                    .write_all(&payload)
                    .await
                    .context("Failed to write response")?;
                writer.flush().await.context("Failed to flush output")?;
            }
        }

        info!("Input closed, shutting down");
        Ok(())
    }

    /// Run over the process's stdin/stdout.
    pub async fn start(&self) -> Result<()> {
        info!("MCP server listening on stdio");
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }
}

fn to_result(value: impl Serialize) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::tests::FakeReddit;
    use serde_json::json;
    use std::sync::Arc;

    fn server() -> (McpServer, Arc<FakeReddit>) {
        let fake = Arc::new(FakeReddit::default());
        (McpServer::new(ToolDispatcher::new(fake.clone())), fake)
    }

    async fn call(server: &McpServer, method: &str, params: Value) -> JsonRpcResponse {
        server
            .handle_request(JsonRpcRequest::new(1, method, params))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let (server, _) = server();
        let response = call(
            &server,
            "initialize",
            json!({
                "protocolVersion": "2025-03-26",
                "capabilities": {},
                "clientInfo": {"name": "test-client", "version": "1.0"}
            }),
        )
        .await;

        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2025-03-26");
        assert_eq!(result["serverInfo"]["name"], "reddit-mcp");
        assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
    }

    #[tokio::test]
    async fn test_tools_list() {
        let (server, _) = server();
        let response = call(&server, "tools/list", Value::Null).await;

        let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();
        assert_eq!(tools.len(), 8);
        assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
    }

    #[tokio::test]
    async fn test_tools_call_success() {
        let (server, _) = server();
        let response = call(
            &server,
            "tools/call",
            json!({"name": "get_subreddit_info", "arguments": {"subreddit_name": "python"}}),
        )
        .await;

        let result = response.result.unwrap();
        assert!(result.get("isError").is_none());
        assert_eq!(result["structuredContent"]["name"], "python");
        assert_eq!(result["content"][0]["type"], "text");
    }

    #[tokio::test]
    async fn test_tools_call_unknown_tool_is_protocol_error() {
        let (server, fake) = server();
        let response = call(
            &server,
            "tools/call",
            json!({"name": "nope", "arguments": {}}),
        )
        .await;

        let error = response.error.unwrap();
        assert_eq!(error.code, JsonRpcError::INVALID_PARAMS);
        assert_eq!(error.message, "Unknown tool: nope");
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_tools_call_validation_error_is_tool_error() {
        let (server, fake) = server();
        let response = call(
            &server,
            "tools/call",
            json!({"name": "get_frontpage_posts", "arguments": {"limit": 0}}),
        )
        .await;

        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("'limit'"), "{}", text);
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_tools_call_missing_name() {
        let (server, _) = server();
        let response = call(&server, "tools/call", json!({"arguments": {}})).await;
        assert_eq!(response.error.unwrap().code, JsonRpcError::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let (server, _) = server();
        let response = call(&server, "resources/list", Value::Null).await;
        assert_eq!(response.error.unwrap().code, JsonRpcError::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let (server, _) = server();
        let response = server
            .handle_request(JsonRpcRequest::notification("notifications/initialized"))
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_notification_with_params_gets_no_response() {
        let (server, fake) = server();
        let response = server
            .handle_message(
                r#"{"jsonrpc":"2.0","method":"tools/call","params":{"name":"get_frontpage_posts"}}"#,
            )
            .await;
        assert!(response.is_none());
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_handle_message_parse_error() {
        let (server, _) = server();
        let response = server.handle_message("{not json").await.unwrap();
        assert_eq!(response.id, Value::Null);
        assert_eq!(response.error.unwrap().code, JsonRpcError::PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_handle_message_invalid_request_keeps_id() {
        let (server, _) = server();
        let response = server
            .handle_message(r#"{"jsonrpc":"2.0","id":7}"#)
            .await
            .unwrap();
        assert_eq!(response.id, json!(7));
        assert_eq!(response.error.unwrap().code, JsonRpcError::INVALID_REQUEST);

        let response = server
            .handle_message(r#"{"jsonrpc":"1.0","id":8,"method":"ping"}"#)
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, JsonRpcError::INVALID_REQUEST);
    }
}
