//! Shared test helpers for executor tests.

use async_trait::async_trait;
use mcplink_core::error::{ProviderError, ToolError};
use mcplink_core::message::{Message, MessageToolCall};
use mcplink_core::provider::{Provider, ProviderRequest, ProviderResponse, StreamChunk, StreamReceiver};
use mcplink_core::tool::{Tool, ToolRegistry, ToolResult};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// One scripted model call.
pub enum MockStep {
    /// Stream these text fragments, then finish without tool calls.
    Text(Vec<String>),
    /// Finish with these tool calls and no text.
    ToolCalls(Vec<MessageToolCall>),
    /// Fail the call.
    Fail(ProviderError),
}

impl MockStep {
    pub fn text(fragments: &[&str]) -> Self {
        Self::Text(fragments.iter().map(|f| f.to_string()).collect())
    }

    pub fn tool_calls(calls: Vec<MessageToolCall>) -> Self {
        Self::ToolCalls(calls)
    }
}

/// A mock provider that plays back scripted steps, one per call, and records
/// every request it receives.
///
/// Panics if more calls are made than steps provided.
pub struct SequentialMockProvider {
    steps: Mutex<Vec<MockStep>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(mut steps: Vec<MockStep>) -> Self {
        steps.reverse();
        Self {
            steps: Mutex::new(steps),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_step(&self, request: ProviderRequest) -> MockStep {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request);
        self.steps
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| panic!("SequentialMockProvider: no step for call #{}", requests.len()))
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let message = match self.next_step(request) {
            MockStep::Text(fragments) => Message::assistant(fragments.concat()),
            MockStep::ToolCalls(calls) => Message::assistant("").with_tool_calls(calls),
            MockStep::Fail(e) => return Err(e),
        };
        Ok(ProviderResponse {
            message,
            usage: None,
            model: "mock-model".into(),
        })
    }

    async fn stream(&self, request: ProviderRequest) -> Result<StreamReceiver, ProviderError> {
        let step = self.next_step(request);
        let (tx, rx) = mpsc::channel(16);
        let chunks = match step {
            MockStep::Fail(e) => return Err(e),
            MockStep::Text(fragments) => fragments
                .into_iter()
                .map(|f| StreamChunk {
                    content: Some(f),
                    ..Default::default()
                })
                .collect(),
            MockStep::ToolCalls(calls) => vec![StreamChunk {
                tool_calls: calls,
                ..Default::default()
            }],
        };
        tokio::spawn(async move {
            for chunk in chunks {
                let _ = tx.send(Ok(chunk)).await;
            }
            let _ = tx
                .send(Ok(StreamChunk {
                    done: true,
                    ..Default::default()
                }))
                .await;
        });
        Ok(rx)
    }
}

/// Helper to create a tool call.
pub fn make_tool_call(name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}

/// Echoes its `text` argument.
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echo the input text"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {"text": {"type": "string"}},
            "required": ["text"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let text = arguments["text"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("missing text".into()))?;
        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output: text.to_string(),
        })
    }
}

pub fn echo_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(EchoTool));
    registry
}
