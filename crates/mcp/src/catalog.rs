//! Tool catalog: every configured server's tools in one registry.

use futures::future::try_join_all;
use mcplink_config::McpServerConfig;
use mcplink_core::error::ToolLoadError;
use mcplink_core::tool::ToolRegistry;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};
use crate::client::McpClient;
use crate::tool::McpTool;

/// Tools discovered from the configured servers.
///
/// The registry keeps the server processes alive; dropping the last handle
/// kills them.
#[derive(Clone)]
pub struct ToolCatalog {
    registry: Arc<ToolRegistry>,
}

impl ToolCatalog {
    /// Connect to every enabled server concurrently and collect its tools.
    ///
    /// Fails on the first server that cannot be started, initialized or
    /// listed; servers already started are shut down.
    pub async fn load(servers: &BTreeMap<String, McpServerConfig>) -> Result<Self, ToolLoadError> {
        let enabled: Vec<_> = servers.iter().filter(|(_, cfg)| cfg.enabled).collect();

        let connected = try_join_all(enabled.iter().map(|&(name, cfg)| async move {
            let client = Arc::new(McpClient::connect(name, cfg).await?);
            let tools = client
                .list_tools()
                .await
                .map_err(|e| ToolLoadError::ListTools {
                    server: name.to_string(),
                    reason: e.to_string(),
                })?;
            Ok::<_, ToolLoadError>((client, tools, cfg.timeout_secs))
        }))
        .await?;

        let mut registry = ToolRegistry::new();
        for (client, tools, timeout_secs) in connected {
            for def in tools {
                let tool_name = def.name.clone();
                if registry.register(Box::new(McpTool::new(client.clone(), def, timeout_secs))) {
                    warn!(server = %client.name(), tool = %tool_name, "Duplicate tool name; later server wins");
                }
            }
        }

        info!(servers = enabled.len(), tools = registry.len(), "Tool catalog loaded");
        Ok(Self::from_registry(registry))
    }

    /// Wrap an existing registry.
    pub fn from_registry(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Tool names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.registry.names().into_iter().map(String::from).collect()
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }
}
