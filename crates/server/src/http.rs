// Streamable HTTP transport (stateless, JSON responses)

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use reddit_mcp::protocol::{JsonRpcError, JsonRpcResponse};
use reddit_mcp::McpServer;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Start the HTTP server
pub async fn serve(addr: &str, mcp_path: &str, server: McpServer) -> Result<()> {
    let app = create_router(mcp_path, server);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("MCP endpoint listening on http://{}{}", addr, mcp_path);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Create the HTTP router
pub fn create_router(mcp_path: &str, server: McpServer) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(mcp_path, post(handle_mcp).get(method_not_allowed))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new())
                .on_response(DefaultOnResponse::new()),
        )
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(server))
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": reddit_mcp::server::SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// One JSON-RPC message per POST. Notifications are acknowledged with 202.
async fn handle_mcp(State(server): State<Arc<McpServer>>, body: Bytes) -> Response {
    let raw = match std::str::from_utf8(&body) {
        Ok(raw) => raw,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(JsonRpcResponse::error(
                    serde_json::Value::Null,
                    JsonRpcError::parse_error(),
                )),
            )
                .into_response()
        }
    };

    match server.handle_message(raw).await {
        Some(response) => {
            let status = match &response.error {
                Some(error) if error.code == JsonRpcError::PARSE_ERROR => StatusCode::BAD_REQUEST,
                _ => StatusCode::OK,
            };
            (status, Json(response)).into_response()
        }
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Stateless mode offers no server-initiated stream.
async fn method_not_allowed() -> StatusCode {
    StatusCode::METHOD_NOT_ALLOWED
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
