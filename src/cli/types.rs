use clap::Parser;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use openapi_mcp::ServerConfig;

use super::toolset::ToolsetConfig;

/// OpenAPI MCP Server - expose any REST API described by an OpenAPI spec as MCP tools
///
/// Every operation (GET, POST, PUT, DELETE, PATCH) in the spec becomes one
/// tool. Tool calls are proxied to the API as HTTP requests.
#[derive(Parser, Debug)]
#[command(name = "openapi-mcp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to OpenAPI specification file (.json, .yaml or .yml)
    #[arg(long, value_name = "PATH", env = "OPENAPI_MCP_SPEC")]
    pub spec: PathBuf,

    /// Name for the MCP server
    #[arg(long, default_value = openapi_mcp::server::DEFAULT_SERVER_NAME)]
    pub name: String,

    /// Base URL for the API
    ///
    /// Overrides the first `servers` entry of the spec.
    #[arg(long, value_name = "URL", env = "OPENAPI_MCP_BASE_URL")]
    pub base_url: Option<String>,

    /// Port to run the HTTP server on
    #[arg(long, default_value = "8123", conflicts_with = "stdio")]
    pub port: u16,

    /// Host to bind the HTTP server to
    #[arg(long, default_value = "localhost", conflicts_with = "stdio")]
    pub host: String,

    /// Serve over stdio instead of streamable HTTP
    #[arg(long)]
    pub stdio: bool,

    /// Timeout in seconds for each proxied API request (default: none)
    /// Can also be set via `OPENAPI_MCP_HTTP_TIMEOUT_SECS` environment variable
    #[arg(long, value_name = "SECONDS", env = "OPENAPI_MCP_HTTP_TIMEOUT_SECS")]
    pub http_timeout: Option<u64>,

    /// Enable specific tools by name (comma-separated)
    ///
    /// Example: --tools listPets,getPet
    ///
    /// If not specified, all tools are enabled.
    #[arg(long, value_delimiter = ',', conflicts_with = "tool")]
    pub tools: Option<Vec<String>>,

    /// Enable specific tool by name (can be specified multiple times)
    ///
    /// Example: --tool listPets --tool getPet
    #[arg(long = "tool", conflicts_with = "tools")]
    pub tool: Vec<String>,

    /// Load tool names from JSON file
    ///
    /// JSON format:
    /// ```json
    /// { "tools": ["listPets", "getPet"] }
    /// ```
    #[arg(long, value_name = "PATH", conflicts_with_all = ["tool", "tools"])]
    pub toolset: Option<PathBuf>,

    /// List the tools synthesized from the spec and exit
    #[arg(long)]
    pub list_tools: bool,
}

impl Cli {
    /// Get the set of enabled tool names
    ///
    /// Returns None if no filter specified (enable all tools)
    /// Returns Some(HashSet) if filter specified (enable only these tools)
    pub fn enabled_tools(&self) -> anyhow::Result<Option<HashSet<String>>> {
        // Priority 1: --toolset (JSON file)
        if let Some(ref path) = self.toolset {
            let config = ToolsetConfig::from_file(path)?;
            return Ok(Some(config.tools.into_iter().collect()));
        }

        // Priority 2: --tools (comma-separated)
        if let Some(tools) = &self.tools {
            return Ok(Some(tools.iter().cloned().collect()));
        }

        // Priority 3: --tool (repeated flags)
        if !self.tool.is_empty() {
            return Ok(Some(self.tool.iter().cloned().collect()));
        }

        Ok(None)
    }

    pub fn http_timeout_duration(&self) -> Option<Duration> {
        self.http_timeout.map(Duration::from_secs)
    }

    /// Library configuration derived from the command line
    pub fn server_config(&self) -> anyhow::Result<ServerConfig> {
        Ok(ServerConfig {
            name: self.name.clone(),
            base_url: self.base_url.clone(),
            request_timeout: self.http_timeout_duration(),
            enabled_tools: self.enabled_tools()?,
        })
    }
}
