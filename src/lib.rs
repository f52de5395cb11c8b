//! Serve any OpenAPI-described REST API as MCP tools.
//!
//! ```no_run
//! use openapi_mcp::{OpenApiMcpServer, ServerConfig};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let document = openapi_mcp::spec::load("specs/petstore.yaml")?;
//! let server = OpenApiMcpServer::from_document(&document, &ServerConfig::default())?;
//! server.serve_stdio().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod server;
pub mod spec;
pub mod tools;

pub use error::{Error, LoadError, SynthesisError};
pub use server::{OpenApiMcpServer, ServerConfig};
