//! Tool-calling agent: streams model output, runs requested tools, repeats.

use mcplink_config::AppConfig;
use mcplink_core::chunk::{DeltaContent, MessageDelta};
use mcplink_core::message::{Message, MessageToolCall, Role};
use mcplink_core::provider::{Provider, ProviderRequest};
use mcplink_core::tool::{ToolCall, ToolRegistry};
use mcplink_core::{AgentInput, AgentState, Chunk, Error};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, warn};
use crate::executor::{AgentExecutor, ChunkStream};
use crate::prompt::system_prompt;

/// Reply used when the step limit is hit while the model still wants tools.
pub const NEED_MORE_STEPS: &str = "Sorry, need more steps to process this request.";

const CHANNEL_CAPACITY: usize = 128;

/// Executor that loops model call → tool calls until the model answers.
#[derive(Clone)]
pub struct ToolCallingAgent {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    max_iterations: u32,
    system_prompt: Option<String>,
}

impl ToolCallingAgent {
    pub fn new(provider: Arc<dyn Provider>, tools: Arc<ToolRegistry>, model: impl Into<String>) -> Self {
        Self {
            provider,
            tools,
            model: model.into(),
            temperature: 0.0,
            max_tokens: None,
            max_iterations: 25,
            system_prompt: None,
        }
    }

    /// Build from the `[llm]` and `[agent]` sections.
    pub fn from_config(provider: Arc<dyn Provider>, tools: Arc<ToolRegistry>, config: &AppConfig) -> Self {
        Self::new(provider, tools, &config.llm.model)
            .with_temperature(config.llm.temperature)
            .with_max_tokens(config.llm.max_tokens)
            .with_max_iterations(config.agent.max_iterations)
            .with_system_prompt(config.llm.system_prompt.clone())
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Model calls allowed per turn (at least one).
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt;
        self
    }

    async fn run_turn(self, input: AgentInput, tx: mpsc::Sender<Result<Chunk, Error>>) {
        match self.drive(input, &tx).await {
            Ok(()) => {}
            Err(Halt::Disconnected) => debug!("Chunk consumer went away; turn abandoned"),
            Err(Halt::Failed(e)) => {
                error!(error = %e, "Agent turn failed");
                let _ = tx.send(Err(e)).await;
            }
        }
    }

    async fn drive(&self, input: AgentInput, tx: &mpsc::Sender<Result<Chunk, Error>>) -> Result<(), Halt> {
        debug!(
            messages = input.messages.len(),
            is_last_step = input.is_last_step,
            "Starting agent turn"
        );

        let system = Message::system(system_prompt(self.system_prompt.as_deref(), input.today_datetime));
        let tool_defs = self.tools.definitions();
        let mut state = AgentState {
            messages: input.messages,
        };

        for step in 1..=self.max_iterations {
            let mut messages = Vec::with_capacity(state.messages.len() + 1);
            messages.push(system.clone());
            messages.extend(state.messages.iter().cloned());

            let request = ProviderRequest {
                model: self.model.clone(),
                messages,
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: tool_defs.clone(),
                stream: true,
            };

            let mut stream_rx = self.provider.stream(request).await.map_err(Error::from)?;
            let mut content = String::new();
            let mut tool_calls: Vec<MessageToolCall> = Vec::new();

            while let Some(item) = stream_rx.recv().await {
                let chunk = item.map_err(Error::from)?;
                if let Some(text) = chunk.content.filter(|t| !t.is_empty()) {
                    content.push_str(&text);
                    emit(tx, Chunk::assistant_text(text)).await?;
                }
                merge_tool_calls(&mut tool_calls, chunk.tool_calls);
            }

            if !tool_calls.is_empty() && step == self.max_iterations {
                warn!(step, pending = tool_calls.len(), "Step limit reached with tool calls pending");
                emit(tx, Chunk::assistant_text(NEED_MORE_STEPS)).await?;
                state.messages.push(Message::assistant(NEED_MORE_STEPS));
                emit(tx, Chunk::ValuesSnapshot(state.clone())).await?;
                break;
            }

            let done = tool_calls.is_empty();
            state
                .messages
                .push(Message::assistant(content).with_tool_calls(tool_calls.clone()));
            emit(tx, Chunk::ValuesSnapshot(state.clone())).await?;

            if done {
                info!(steps = step, "Agent turn complete");
                break;
            }

            for tc in &tool_calls {
                let output = self.execute_tool(tc).await;
                emit(
                    tx,
                    Chunk::MessageDelta(MessageDelta {
                        role: Role::Tool,
                        content: DeltaContent::Text(output.clone()),
                    }),
                )
                .await?;
                state.messages.push(Message::tool_result(&tc.id, output));
            }
            emit(tx, Chunk::ValuesSnapshot(state.clone())).await?;
        }

        emit(tx, Chunk::EndOfTurn(state)).await
    }

    /// Run one tool call. Failures become text the model can read.
    async fn execute_tool(&self, tc: &MessageToolCall) -> String {
        let arguments = if tc.arguments.trim().is_empty() {
            serde_json::json!({})
        } else {
            match serde_json::from_str(&tc.arguments) {
                Ok(args) => args,
                Err(e) => {
                    warn!(tool = %tc.name, error = %e, "Tool arguments are not valid JSON");
                    return format!("Error: invalid arguments for {}: {e}", tc.name);
                }
            }
        };

        let call = ToolCall {
            id: tc.id.clone(),
            name: tc.name.clone(),
            arguments,
        };

        debug!(tool = %tc.name, id = %tc.id, "Executing tool");
        match self.tools.execute(&call).await {
            Ok(result) => {
                if !result.success {
                    warn!(tool = %tc.name, "Tool reported failure");
                }
                result.output
            }
            Err(e) => {
                warn!(tool = %tc.name, error = %e, "Tool execution failed");
                format!("Error: {e}")
            }
        }
    }
}

impl AgentExecutor for ToolCallingAgent {
    fn stream(&self, input: AgentInput) -> ChunkStream {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(self.clone().run_turn(input, tx));
        Box::pin(ReceiverStream::new(rx))
    }
}

/// Why a turn stopped early.
enum Halt {
    Disconnected,
    Failed(Error),
}

impl From<Error> for Halt {
    fn from(e: Error) -> Self {
        Halt::Failed(e)
    }
}

async fn emit(tx: &mpsc::Sender<Result<Chunk, Error>>, chunk: Chunk) -> Result<(), Halt> {
    tx.send(Ok(chunk)).await.map_err(|_| Halt::Disconnected)
}

/// Providers may deliver a call in pieces; pieces sharing an id are joined.
fn merge_tool_calls(acc: &mut Vec<MessageToolCall>, incoming: Vec<MessageToolCall>) {
    for tc in incoming {
        match acc.iter_mut().find(|t| !tc.id.is_empty() && t.id == tc.id) {
            Some(existing) => existing.arguments.push_str(&tc.arguments),
            None => acc.push(tc),
        }
    }
}
