//! Adapter from an MCP tool to the core `Tool` trait.

use async_trait::async_trait;
use mcplink_core::error::ToolError;
use mcplink_core::tool::{Tool, ToolResult};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use crate::client::McpClient;
use crate::types::McpToolDef;

/// One remote tool, called through its server's client.
pub struct McpTool {
    client: Arc<McpClient>,
    def: McpToolDef,
    timeout_secs: u64,
}

impl McpTool {
    pub fn new(client: Arc<McpClient>, def: McpToolDef, timeout_secs: u64) -> Self {
        Self {
            client,
            def,
            timeout_secs,
        }
    }

    /// Name of the server providing this tool.
    pub fn server(&self) -> &str {
        self.client.name()
    }
}

#[async_trait]
impl Tool for McpTool {
    fn name(&self) -> &str {
        &self.def.name
    }

    fn description(&self) -> &str {
        &self.def.description
    }

    fn parameters_schema(&self) -> Value {
        self.def.input_schema.clone()
    }

    /// Tool-reported errors and transport failures come back as unsuccessful
    /// results so the model can see them; only a timeout is an `Err`.
    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let arguments = match arguments {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        let call = self.client.call_tool(&self.def.name, arguments);
        let outcome = tokio::time::timeout(Duration::from_secs(self.timeout_secs), call)
            .await
            .map_err(|_| ToolError::Timeout {
                tool_name: self.def.name.clone(),
                timeout_secs: self.timeout_secs,
            })?;

        let result = match outcome {
            Ok(result) => ToolResult {
                call_id: String::new(),
                success: !result.is_error,
                output: result.to_text(),
            },
            Err(e) => {
                tracing::warn!(server = %self.server(), tool = %self.def.name, error = %e, "MCP tool call failed");
                ToolResult {
                    call_id: String::new(),
                    success: false,
                    output: format!("MCP server '{}' failed: {e}", self.server()),
                }
            }
        };
        Ok(result)
    }
}
