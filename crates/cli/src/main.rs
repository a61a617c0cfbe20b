//! mcplink CLI: the main entry point.
//!
//! Commands:
//! - (none)  : interactive mode (`list-tools`, `chat`, `clear`, `help`, `quit`)
//! - `tools` : list the tools the configured MCP servers provide
//! - `chat`  : run a single chat turn
//! - `serve` : start the HTTP API

use clap::{Parser, Subcommand};
use mcplink_config::AppConfig;
use std::path::PathBuf;

mod commands;
mod input;

#[derive(Parser)]
#[command(
    name = "mcplink",
    about = "mcplink: chat with an LLM agent that uses MCP tool servers",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (TOML, or JSON with a .json extension)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available tools
    Tools,

    /// Send a single message and print the streamed reply
    Chat {
        #[arg(short, long)]
        message: String,
    },

    /// Start the HTTP API server
    Serve {
        /// Override the bind host
        #[arg(long)]
        host: Option<String>,

        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Terminal output owns stdout; logs go to stderr
    let filter = match (&cli.command, cli.verbose) {
        (_, true) => "debug",
        (Some(Commands::Serve { .. }), false) => "info",
        _ => "warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load(cli.config.as_deref()).map_err(|e| format!("Failed to load config: {e}"))?;

    match cli.command {
        None => commands::repl::run(config).await?,
        Some(Commands::Tools) => commands::tools::run(&config).await?,
        Some(Commands::Chat { message }) => commands::chat::run_once(config, message).await?,
        Some(Commands::Serve { host, port }) => commands::serve::run(config, host, port).await?,
    }

    Ok(())
}
