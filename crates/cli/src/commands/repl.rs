//! Interactive mode: the `>>> ` command loop.

use mcplink_agent::{AgentFactory, McpAgentFactory};
use mcplink_config::AppConfig;
use std::sync::Arc;
use tokio::io::AsyncBufRead;
use crate::commands::{chat, clear_screen, tools};
use crate::input::{Input, LineReader};

const HELP: &str = "\
Available commands:
  list-tools    - Display available tools
  chat          - Enter chat mode
  clear         - Clear the screen
  help          - Show this help message
  quit/exit     - Exit the program";

/// A line typed at the `>>> ` prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum ReplCommand {
    ListTools,
    Chat,
    Clear,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "list-tools" => Self::ListTools,
            "chat" => Self::Chat,
            "clear" => Self::Clear,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            "" => Self::Empty,
            other => Self::Unknown(other.to_string()),
        }
    }
}

pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let factory = McpAgentFactory::new(Arc::new(config));
    let mut reader = LineReader::stdin();

    println!("\nWelcome to the Interactive MCP Command-Line Tool");
    println!("Type 'help' for available commands or 'quit' to exit");

    loop {
        let line = match reader.read(">>> ").await? {
            Input::Line(line) => line,
            Input::Interrupted => {
                println!("\nUse 'quit' or 'exit' to close the program");
                continue;
            }
            Input::Eof => break,
        };

        match handle(ReplCommand::parse(&line), &factory, &mut reader).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => println!("\nError executing command: {e}"),
        }
    }
    Ok(())
}

/// Run one command. Returns false when the program should exit.
async fn handle<R>(
    command: ReplCommand,
    factory: &dyn AgentFactory,
    reader: &mut LineReader<R>,
) -> Result<bool, Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
{
    match command {
        ReplCommand::ListTools => {
            println!("\nFetching Tools List...\n");
            tools::print_tools(factory).await?;
        }
        ReplCommand::Chat => {
            println!("\nEntering chat mode...");
            chat::chat_mode(factory, reader).await?;
        }
        ReplCommand::Clear => clear_screen()?,
        ReplCommand::Help => println!("\n{HELP}"),
        ReplCommand::Quit => {
            println!("\nGoodbye!");
            return Ok(false);
        }
        ReplCommand::Empty => {}
        ReplCommand::Unknown(other) => {
            println!("\nUnknown command: {other}");
            println!("Type 'help' for available commands");
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mcplink_agent::AgentExecutor;
    use mcplink_core::Error;
    use mcplink_core::error::ToolLoadError;

    struct BrokenFactory;

    #[async_trait]
    impl AgentFactory for BrokenFactory {
        async fn tool_names(&self) -> Result<Vec<String>, Error> {
            Err(ToolLoadError::Spawn {
                server: "weather".into(),
                reason: "no such file".into(),
            }
            .into())
        }

        async fn executor(&self) -> Result<Arc<dyn AgentExecutor>, Error> {
            Err(Error::Internal("unavailable".into()))
        }
    }

    #[test]
    fn parse_commands() {
        assert_eq!(ReplCommand::parse("list-tools"), ReplCommand::ListTools);
        assert_eq!(ReplCommand::parse(" chat "), ReplCommand::Chat);
        assert_eq!(ReplCommand::parse("exit"), ReplCommand::Quit);
        assert_eq!(ReplCommand::parse("quit"), ReplCommand::Quit);
        assert_eq!(ReplCommand::parse(""), ReplCommand::Empty);
        assert_eq!(ReplCommand::parse("QUIT"), ReplCommand::Unknown("QUIT".into()));
        assert_eq!(ReplCommand::parse("dance"), ReplCommand::Unknown("dance".into()));
    }

    #[tokio::test]
    async fn quit_stops_and_others_continue() {
        let mut reader = LineReader::new(&b""[..]);
        assert!(!handle(ReplCommand::Quit, &BrokenFactory, &mut reader).await.unwrap());
        assert!(handle(ReplCommand::Help, &BrokenFactory, &mut reader).await.unwrap());
        assert!(handle(ReplCommand::Unknown("x".into()), &BrokenFactory, &mut reader).await.unwrap());
    }

    #[tokio::test]
    async fn failing_commands_surface_their_cause() {
        let mut reader = LineReader::new(&b""[..]);
        let err = handle(ReplCommand::ListTools, &BrokenFactory, &mut reader).await.unwrap_err();
        assert!(err.to_string().contains("weather"));
        let err = handle(ReplCommand::Chat, &BrokenFactory, &mut reader).await.unwrap_err();
        assert!(err.to_string().contains("unavailable"));
    }
}
