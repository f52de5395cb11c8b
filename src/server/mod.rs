//! MCP tool host adapter.
//!
//! [`OpenApiMcpServer`] exposes a [`ToolRegistry`](crate::tools::ToolRegistry)
//! through rmcp's `ServerHandler`, served over stdio or streamable HTTP.

mod config;
mod handler;
mod transport;

pub use config::{ServerConfig, DEFAULT_SERVER_NAME};
pub use handler::OpenApiMcpServer;
pub use transport::MCP_ENDPOINT;
