use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

mod config;
mod http;

use config::ServerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    /// Local pipe: JSON-RPC on stdin/stdout
    Stdio,
    /// Remote: JSON-RPC over HTTP POST
    StreamableHttp,
}

#[derive(Parser, Debug)]
#[command(name = "reddit-mcp-server")]
#[command(about = "MCP server exposing Reddit's public read API as tools", long_about = None)]
#[command(version)]
struct Args {
    /// Transport mode: stdio for local, streamable-http for remote
    #[arg(long, value_enum, default_value_t = Transport::Stdio, env = "REDDIT_MCP_TRANSPORT")]
    transport: Transport,

    /// Host for HTTP transport
    #[arg(long, default_value = "127.0.0.1", env = "REDDIT_MCP_HOST")]
    host: String,

    /// Port for HTTP transport
    #[arg(short, long, default_value = "8081", env = "REDDIT_MCP_PORT")]
    port: u16,

    /// Path to configuration file
    #[arg(short, long, default_value = "reddit-mcp.toml", env = "REDDIT_MCP_CONFIG")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing. Logs go to stderr: stdout carries the stdio protocol.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reddit_mcp=info,reddit_mcp_core=info,reddit_mcp_server=info,tower_http=info".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    tracing::info!("Starting Reddit MCP server ({:?} transport)", args.transport);

    // Load configuration
    let config = ServerConfig::load(&args.config)?;
    tracing::info!("Reddit API base URL: {}", config.reddit.base_url);

    let server = config.build_server()?;

    match args.transport {
        Transport::Stdio => server.start().await?,
        Transport::StreamableHttp => {
            let addr = format!("{}:{}", args.host, args.port);
            tracing::info!("Starting HTTP server on {}", addr);
            http::serve(&addr, &config.http.mcp_path, server).await?;
        }
    }

    Ok(())
}
