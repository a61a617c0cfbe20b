//! Chat mode: the interactive `chat` sub-loop and one-shot `mcplink chat`.

use chrono::Utc;
use mcplink_agent::{AgentExecutor, AgentFactory, McpAgentFactory};
use mcplink_config::AppConfig;
use mcplink_core::message::{Conversation, Message};
use mcplink_core::{AgentInput, AgentState};
use mcplink_relay::{OutputSink, RelayError, Surface, TerminalSink, relay};
use std::sync::Arc;
use tokio::io::AsyncBufRead;
use tracing::debug;
use crate::commands::clear_screen;
use crate::input::{Input, LineReader};

/// A line typed at the `You: ` prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum ChatInput {
    Exit,
    Clear,
    Empty,
    Message(String),
}

impl ChatInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line.to_lowercase().as_str() {
            "exit" | "quit" => Self::Exit,
            "clear" | "cls" => Self::Clear,
            "" => Self::Empty,
            _ => Self::Message(line.to_string()),
        }
    }
}

/// The conversation of one chat session.
///
/// History holds user messages and the content of each turn's final reply.
pub struct ChatSession {
    executor: Arc<dyn AgentExecutor>,
    history: Conversation,
    is_last_step: bool,
}

impl ChatSession {
    pub fn new(executor: Arc<dyn AgentExecutor>) -> Self {
        Self {
            executor,
            history: Conversation::new(),
            is_last_step: false,
        }
    }

    pub fn history(&self) -> &Conversation {
        &self.history
    }

    /// Forget the conversation. The next turn is flagged `is_last_step`.
    pub fn reset(&mut self) {
        self.history.clear();
        self.is_last_step = true;
    }

    /// Run one turn, rendering it into `sink`.
    ///
    /// The user message stays in history even if the turn fails.
    pub async fn send<O>(&mut self, text: &str, sink: &mut O) -> Result<(), RelayError>
    where
        O: OutputSink + ?Sized,
    {
        self.history.push(Message::user(text));
        let input = AgentInput {
            messages: self.history.messages().to_vec(),
            is_last_step: self.is_last_step,
            today_datetime: Utc::now(),
        };
        self.is_last_step = false;

        let outcome = relay(self.executor.stream(input), sink, Surface::Interactive).await?;
        if let Some(reply) = outcome.final_state.as_ref().and_then(AgentState::last) {
            self.history.push(Message::assistant(reply.content.clone()));
        }
        debug!(history = self.history.len(), "Chat turn complete");
        Ok(())
    }
}

/// The `chat` sub-loop. Returns when the user leaves chat mode or input ends.
pub(crate) async fn chat_mode<R>(
    factory: &dyn AgentFactory,
    reader: &mut LineReader<R>,
) -> Result<(), Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
{
    let mut session = ChatSession::new(factory.executor().await?);
    let mut sink = TerminalSink::stdout();

    loop {
        let line = match reader.read("\nYou: ").await? {
            Input::Line(line) => line,
            Input::Interrupted => {
                println!("\nUse 'exit' or 'quit' to leave chat mode");
                continue;
            }
            Input::Eof => {
                println!();
                return Ok(());
            }
        };

        match ChatInput::parse(&line) {
            ChatInput::Exit => {
                println!("Exiting chat mode.");
                return Ok(());
            }
            ChatInput::Clear => {
                clear_screen()?;
                session.reset();
            }
            ChatInput::Empty => {}
            ChatInput::Message(text) => {
                tokio::select! {
                    result = session.send(&text, &mut sink) => {
                        if let Err(e) = result {
                            println!("\nError processing message: {e}");
                        }
                    }
                    _ = tokio::signal::ctrl_c() => println!("\nInterrupted."),
                }
            }
        }
    }
}

/// `mcplink chat --message <text>`: a single turn rendered to the terminal.
pub async fn run_once(config: AppConfig, message: String) -> Result<(), Box<dyn std::error::Error>> {
    let factory = McpAgentFactory::new(Arc::new(config));
    let mut session = ChatSession::new(factory.executor().await?);
    session.send(&message, &mut TerminalSink::stdout()).await?;
    Ok(())
}
