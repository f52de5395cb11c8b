use anyhow::{Context, Result};
use rmcp::{
    ServiceExt,
    transport::{
        stdio,
        streamable_http_server::{
            StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
        },
    },
};
use tokio_util::sync::CancellationToken;

use super::OpenApiMcpServer;

/// Route the streamable HTTP transport is mounted on.
pub const MCP_ENDPOINT: &str = "/mcp";

impl OpenApiMcpServer {
    /// Serve over stdin/stdout until the client disconnects.
    pub async fn serve_stdio(self) -> Result<()> {
        log::info!(
            "Starting stdio server '{}' with {} tools",
            self.name(),
            self.registry().len()
        );

        let service = self.serve(stdio()).await.inspect_err(|e| {
            log::error!("serving error: {e:?}");
        })?;
        service.waiting().await?;

        log::info!("Stdio server stopped");
        Ok(())
    }

    /// Serve the streamable HTTP transport at `http://{host}:{port}/mcp`
    /// until `shutdown` is cancelled.
    pub async fn serve_http(self, host: &str, port: u16, shutdown: CancellationToken) -> Result<()> {
        let tool_count = self.registry().len();
        let name = self.name().to_string();

        let service = StreamableHttpService::new(
            move || Ok(self.clone()),
            LocalSessionManager::default().into(),
            StreamableHttpServerConfig::default(),
        );
        let router = axum::Router::new().nest_service(MCP_ENDPOINT, service);

        let listener = tokio::net::TcpListener::bind((host, port))
            .await
            .with_context(|| format!("Failed to bind {host}:{port}"))?;
        let local_addr = listener.local_addr()?;

        log::info!("Serving '{name}' ({tool_count} tools) at http://{local_addr}{MCP_ENDPOINT}");

        axum::serve(listener, router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .context("HTTP server error")?;

        log::info!("HTTP server stopped");
        Ok(())
    }
}
