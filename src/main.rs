use anyhow::{Context, Result};
use clap::Parser;
use openapi_mcp::{Error, OpenApiMcpServer, SynthesisError, spec, tools};

mod cli;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load the spec first: configuration errors are fatal before anything starts
    let document = spec::load(&cli.spec)
        .with_context(|| format!("Failed to load OpenAPI spec: {}", cli.spec.display()))?;

    // Handle list-tools flag
    if cli.list_tools {
        println!("Available tools:");
        for tool in tools::synthesize(&document) {
            println!("  - {} ({})", tool.name(), tool.endpoint());
        }
        return Ok(());
    }

    let config = cli.server_config()?;

    let server = match OpenApiMcpServer::from_document(&document, &config) {
        Ok(server) => server,
        Err(Error::Synthesis(SynthesisError::UnknownTools(invalid))) => {
            eprintln!("Error: Invalid tool names specified:");
            for tool in &invalid {
                eprintln!("  - {tool}");
            }
            eprintln!();
            eprintln!("Available tools:");
            for tool in tools::synthesize(&document) {
                eprintln!("  - {}", tool.name());
            }
            eprintln!();
            eprintln!("Tip: Use --list-tools to see all available tools");
            return Err(anyhow::anyhow!("Invalid tool names specified"));
        }
        Err(e) => return Err(e).context("Failed to build tools from spec"),
    };

    if cli.stdio {
        return server.serve_stdio().await;
    }

    // Create cancellation token for graceful shutdown
    let shutdown_token = tokio_util::sync::CancellationToken::new();

    // Spawn cross-platform signal handler
    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        wait_for_interrupt().await;
        log::info!("Received interrupt signal, shutting down");
        signal_token.cancel();
    });

    server.serve_http(&cli.host, cli.port, shutdown_token).await
}

/// Resolve on Ctrl+C, or on SIGTERM where the platform has it
async fn wait_for_interrupt() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
