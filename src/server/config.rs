//! Library-side startup configuration, independent of the CLI.

use std::collections::HashSet;
use std::time::Duration;

use crate::spec::Document;

pub const DEFAULT_SERVER_NAME: &str = "openapi";

/// Startup configuration for an [`OpenApiMcpServer`](super::OpenApiMcpServer).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Display name reported to MCP clients
    pub name: String,
    /// Takes precedence over the document's `servers[0].url`
    pub base_url: Option<String>,
    /// Per-request timeout for proxied API calls (None = no timeout)
    pub request_timeout: Option<Duration>,
    /// Tool names to expose (None = all)
    pub enabled_tools: Option<HashSet<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SERVER_NAME.to_string(),
            base_url: None,
            request_timeout: None,
            enabled_tools: None,
        }
    }
}

impl ServerConfig {
    /// Explicit override, else `servers[0].url`, else empty.
    pub fn resolve_base_url(&self, document: &Document) -> String {
        self.base_url
            .clone()
            .or_else(|| document.server_url().map(str::to_string))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_base_url_precedence() {
        let with_servers = Document::from_value(json!({"servers": [{"url": "http://from-spec"}]}));
        let without = Document::from_value(json!({}));

        let mut config = ServerConfig::default();
        assert_eq!(config.resolve_base_url(&with_servers), "http://from-spec");
        assert_eq!(config.resolve_base_url(&without), "");

        config.base_url = Some("http://override".to_string());
        assert_eq!(config.resolve_base_url(&with_servers), "http://override");
    }
}
