//! `mcplink tools`: list tool names, one per line.

use mcplink_agent::{AgentFactory, McpAgentFactory};
use mcplink_config::AppConfig;
use std::sync::Arc;

pub async fn run(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let factory = McpAgentFactory::new(Arc::new(config.clone()));
    print_tools(&factory).await
}

pub(crate) async fn print_tools(factory: &dyn AgentFactory) -> Result<(), Box<dyn std::error::Error>> {
    for name in factory.tool_names().await? {
        println!("{name}");
    }
    Ok(())
}
