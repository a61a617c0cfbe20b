//! Chunk classification.

use mcplink_core::chunk::{DeltaContent, MessageDelta};
use mcplink_core::message::Role;
use mcplink_core::{AgentState, Chunk};
use crate::trace::format_tool_calls;

/// Where the output is going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// A terminal: tool calls are traced and turns end with a newline.
    Interactive,
    /// An HTTP response: text only.
    Rest,
}

/// What a chunk contributes to the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Text(String),
    EndOfTurn,
    ToolTrace(String),
    Nothing,
}

/// Classify one chunk for `surface`. Pure.
pub fn classify(chunk: &Chunk, surface: Surface) -> Classified {
    match (chunk, surface) {
        (Chunk::MessageDelta(delta), _) => delta_text(delta).map_or(Classified::Nothing, Classified::Text),
        (Chunk::EndOfTurn(_), Surface::Interactive) => Classified::EndOfTurn,
        (Chunk::ValuesSnapshot(state), Surface::Interactive) => {
            pending_tool_calls(state).map_or(Classified::Nothing, Classified::ToolTrace)
        }
        _ => Classified::Nothing,
    }
}

/// Display text of a delta payload: the string itself, or the `text` of
/// every part that has one, in order.
pub fn extract_text(content: &DeltaContent) -> String {
    match content {
        DeltaContent::Text(text) => text.clone(),
        DeltaContent::Parts(parts) => parts.iter().filter_map(|p| p.text.as_deref()).collect(),
    }
}

fn delta_text(delta: &MessageDelta) -> Option<String> {
    (delta.role == Role::Assistant).then(|| extract_text(&delta.content))
}

fn pending_tool_calls(state: &AgentState) -> Option<String> {
    state
        .last()
        .filter(|m| m.requests_tools())
        .map(format_tool_calls)
}
