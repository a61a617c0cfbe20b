//! `mcplink serve`: start the HTTP API server.

use mcplink_agent::McpAgentFactory;
use mcplink_config::AppConfig;
use std::sync::Arc;

pub async fn run(
    mut config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(host) = host {
        config.gateway.host = host;
    }
    if let Some(port) = port {
        config.gateway.port = port;
    }

    println!("mcplink gateway");
    println!("   Listening: http://{}:{}", config.gateway.host, config.gateway.port);
    println!("   Model:     {} ({})", config.llm.model, config.llm.provider);
    println!("   Servers:   {}", config.enabled_servers().count());

    let factory = Arc::new(McpAgentFactory::new(Arc::new(config.clone())));
    mcplink_gateway::start(&config, factory).await
}
