use std::path::Path;
use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject,
        ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
        Tool,
    },
    service::RequestContext,
};
use serde_json::Value;

use super::ServerConfig;
use crate::error::Error;
use crate::spec::{self, Document};
use crate::tools::{synthesize, ApiTool, InvocationOutcome, Invoker, ToolRegistry};

/// MCP server exposing one tool per API operation
///
/// Cheap to clone: all state is shared and read-only after construction,
/// so concurrent tool calls need no locking.
#[derive(Clone)]
pub struct OpenApiMcpServer {
    inner: Arc<ServerState>,
}

struct ServerState {
    name: String,
    registry: ToolRegistry,
    invoker: Invoker,
    /// MCP descriptors, rendered once
    listed: Vec<Tool>,
}

impl OpenApiMcpServer {
    pub fn new(name: impl Into<String>, registry: ToolRegistry, invoker: Invoker) -> Self {
        let listed = registry.iter().map(|tool| to_mcp_tool(tool)).collect();
        Self {
            inner: Arc::new(ServerState {
                name: name.into(),
                registry,
                invoker,
                listed,
            }),
        }
    }

    /// Synthesize tools from `document` and wire up the invoker.
    ///
    /// Fails on duplicate tool names, unknown names in
    /// `config.enabled_tools`, or an HTTP client that cannot be built.
    pub fn from_document(document: &Document, config: &ServerConfig) -> Result<Self, Error> {
        let mut registry = ToolRegistry::new(synthesize(document))?;
        if let Some(enabled) = &config.enabled_tools {
            registry = registry.retain_enabled(enabled)?;
        }

        let base_url = config.resolve_base_url(document);
        if base_url.is_empty() {
            log::warn!("No base URL configured and spec declares no servers; requests will use bare paths");
        }
        let invoker = Invoker::new(base_url, config.request_timeout)
            .map_err(crate::error::SynthesisError::from)?;

        log::info!(
            "Synthesized {} tools for '{}' (base URL: '{}')",
            registry.len(),
            config.name,
            invoker.base_url()
        );
        Ok(Self::new(config.name.clone(), registry, invoker))
    }

    /// Load a spec file and build a server from it.
    pub fn from_spec_file(path: impl AsRef<Path>, config: &ServerConfig) -> Result<Self, Error> {
        let document = spec::load(path)?;
        Self::from_document(&document, config)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.inner.registry
    }

    pub fn invoker(&self) -> &Invoker {
        &self.inner.invoker
    }

    /// Tool descriptors as listed to MCP clients.
    pub fn tools(&self) -> &[Tool] {
        &self.inner.listed
    }

    /// Invoke a tool by name.
    ///
    /// Unknown names are a protocol error. API failures come back as a
    /// `CallToolResult` flagged `is_error` whose text is the failure message.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let tool = self
            .inner
            .registry
            .get(name)
            .ok_or_else(|| McpError::invalid_params(format!("Unknown tool: {name}"), None))?;

        let arguments = arguments.unwrap_or_default();
        log::debug!("Calling tool '{}' ({})", name, tool.endpoint());

        Ok(match self.inner.invoker.invoke(tool, &arguments).await {
            InvocationOutcome::Success(value) => {
                CallToolResult::success(vec![Content::text(render_json(&value))])
            }
            InvocationOutcome::Failure(failure) => {
                CallToolResult::error(vec![Content::text(failure.message)])
            }
        })
    }
}

fn to_mcp_tool(tool: &ApiTool) -> Tool {
    Tool::new(
        tool.name().to_string(),
        tool.description(),
        Arc::new(tool.input_schema()),
    )
}

fn render_json(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

impl ServerHandler for OpenApiMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.inner.name.clone(),
                ..Implementation::from_build_env()
            },
            instructions: Some(format!(
                "{} - {} REST API operations exposed as MCP tools",
                self.inner.name,
                self.inner.registry.len()
            )),
        }
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.call(&request.name, request.arguments).await
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        log::debug!("Listing {} tools", self.inner.listed.len());
        Ok(ListToolsResult::with_all_items(self.inner.listed.clone()))
    }
}
