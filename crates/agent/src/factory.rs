//! Building executors from configuration.

use async_trait::async_trait;
use mcplink_config::AppConfig;
use mcplink_core::Error;
use mcplink_mcp::ToolCatalog;
use mcplink_providers::build_provider;
use std::sync::Arc;
use tracing::debug;
use crate::executor::AgentExecutor;
use crate::tool_calling::ToolCallingAgent;

/// Source of tool listings and ready-to-run executors.
///
/// The HTTP gateway holds one of these and asks it for a fresh executor per
/// request.
#[async_trait]
pub trait AgentFactory: Send + Sync {
    /// Names of every tool the configured servers provide.
    async fn tool_names(&self) -> Result<Vec<String>, Error>;

    /// A new executor with the current tool catalog.
    async fn executor(&self) -> Result<Arc<dyn AgentExecutor>, Error>;
}

/// Factory that starts the configured MCP servers on every call.
pub struct McpAgentFactory {
    config: Arc<AppConfig>,
}

impl McpAgentFactory {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

#[async_trait]
impl AgentFactory for McpAgentFactory {
    async fn tool_names(&self) -> Result<Vec<String>, Error> {
        let catalog = ToolCatalog::load(&self.config.mcp_servers).await?;
        Ok(catalog.names())
    }

    async fn executor(&self) -> Result<Arc<dyn AgentExecutor>, Error> {
        // Provider first: a missing key should not cost a round of server spawns
        let provider = build_provider(&self.config.llm)?;
        let catalog = ToolCatalog::load(&self.config.mcp_servers).await?;
        debug!(provider = provider.name(), tools = catalog.names().len(), "Built agent executor");
        Ok(Arc::new(ToolCallingAgent::from_config(
            provider,
            catalog.registry(),
            &self.config,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcplink_config::McpServerConfig;

    fn config_with(server: Option<&str>) -> AppConfig {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("sk-test".into());
        if let Some(cmd) = server {
            config
                .mcp_servers
                .insert("broken".into(), McpServerConfig::new(cmd));
        }
        config
    }

    #[tokio::test]
    async fn no_servers_lists_no_tools() {
        let factory = McpAgentFactory::new(Arc::new(config_with(None)));
        assert!(factory.tool_names().await.unwrap().is_empty());
        assert!(factory.executor().await.is_ok());
    }

    #[tokio::test]
    async fn broken_server_fails_listing_and_executor() {
        let factory = McpAgentFactory::new(Arc::new(config_with(Some("no-such-mcp-binary-anywhere"))));
        let err = factory.tool_names().await.unwrap_err();
        assert!(err.to_string().contains("broken"));
        assert!(factory.executor().await.is_err());
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_servers_start() {
        let mut config = config_with(None);
        config.llm.api_key = None;
        let factory = McpAgentFactory::new(Arc::new(config));
        let err = factory.executor().await.err().unwrap();
        assert!(matches!(err, Error::Provider(_)));
    }
}
