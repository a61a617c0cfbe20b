//! MCP client: handshake, tool discovery and tool calls for one server.

use mcplink_config::McpServerConfig;
use mcplink_core::error::ToolLoadError;
use serde_json::{Value, json};
use tracing::{debug, info};
use crate::PROTOCOL_VERSION;
use crate::env::expand_env;
use crate::error::McpError;
use crate::transport::StdioTransport;
use crate::types::{InitializeResult, ListToolsResult, McpToolDef, McpToolResult};

/// Upper bound on `tools/list` pages, guarding against cursor loops.
const MAX_TOOL_PAGES: usize = 64;

/// An initialized connection to one MCP server.
pub struct McpClient {
    name: String,
    transport: StdioTransport,
    init: InitializeResult,
}

impl McpClient {
    /// Spawn the configured server and complete the handshake.
    pub async fn connect(name: &str, config: &McpServerConfig) -> Result<Self, ToolLoadError> {
        let env = expand_env(&config.env);
        let transport =
            StdioTransport::spawn(&config.command, &config.args, &env).map_err(|e| {
                ToolLoadError::Spawn {
                    server: name.to_string(),
                    reason: format!("{}: {e}", config.command),
                }
            })?;

        Self::initialize(name, transport)
            .await
            .map_err(|e| ToolLoadError::Handshake {
                server: name.to_string(),
                reason: e.to_string(),
            })
    }

    /// Run `initialize` + `notifications/initialized` over an open transport.
    pub async fn initialize(name: &str, transport: StdioTransport) -> Result<Self, McpError> {
        let result = transport
            .request(
                "initialize",
                Some(json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": {
                        "name": env!("CARGO_PKG_NAME"),
                        "version": env!("CARGO_PKG_VERSION")
                    }
                })),
            )
            .await?;
        let init: InitializeResult = serde_json::from_value(result)?;
        transport.notify("notifications/initialized", None).await?;

        info!(
            server = name,
            protocol = %init.protocol_version,
            remote = init.server_info.as_ref().map(|s| s.name.as_str()).unwrap_or("unknown"),
            "Connected to MCP server"
        );

        Ok(Self {
            name: name.to_string(),
            transport,
            init,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn supports_tools(&self) -> bool {
        self.init.capabilities.tools.is_some()
    }

    /// Every tool the server advertises, following pagination cursors.
    /// Servers without the tools capability report none.
    pub async fn list_tools(&self) -> Result<Vec<McpToolDef>, McpError> {
        if !self.supports_tools() {
            debug!(server = %self.name, "Server does not advertise tools");
            return Ok(Vec::new());
        }

        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;
        for _ in 0..MAX_TOOL_PAGES {
            let params = cursor.as_ref().map(|c| json!({ "cursor": c }));
            let page: ListToolsResult =
                serde_json::from_value(self.transport.request("tools/list", params).await?)?;
            tools.extend(page.tools);
            match page.next_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        debug!(server = %self.name, count = tools.len(), "Listed MCP tools");
        Ok(tools)
    }

    /// Invoke `tools/call`.
    pub async fn call_tool(&self, tool: &str, arguments: Value) -> Result<McpToolResult, McpError> {
        let result = self
            .transport
            .request("tools/call", Some(json!({ "name": tool, "arguments": arguments })))
            .await?;
        Ok(serde_json::from_value(result)?)
    }
}
