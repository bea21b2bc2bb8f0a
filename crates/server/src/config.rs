use anyhow::{Context, Result};
use reddit_mcp::{McpServer, ToolDispatcher};
use reddit_mcp_core::{RedditClient, RedditConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default)]
    pub reddit: RedditConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpConfig {
    /// Path of the MCP endpoint when serving over HTTP.
    #[serde(default = "default_mcp_path")]
    pub mcp_path: String,
}

fn default_mcp_path() -> String {
    "/mcp".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            mcp_path: default_mcp_path(),
        }
    }
}

impl ServerConfig {
    pub fn load(config_path: &Path) -> Result<Self> {
        // Load config file if it exists, otherwise use defaults
        let config: Self = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .context("Failed to read configuration file")?;
            toml::from_str(&content).context("Failed to parse configuration file")?
        } else {
            tracing::info!(
                "Configuration file {} not found, using defaults",
                config_path.display()
            );
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.reddit
            .validate()
            .context("Invalid [reddit] configuration")?;
        if !self.http.mcp_path.starts_with('/') || self.http.mcp_path == "/health" {
            anyhow::bail!(
                "Invalid [http] configuration: mcp_path must start with '/' and not be /health, got {:?}",
                self.http.mcp_path
            );
        }
        Ok(())
    }

    /// Build the MCP handler shared by both transports.
    pub fn build_server(&self) -> Result<McpServer> {
        let client = RedditClient::new(&self.reddit).context("Failed to create Reddit client")?;
        Ok(McpServer::new(ToolDispatcher::new(Arc::new(client))))
    }
}
