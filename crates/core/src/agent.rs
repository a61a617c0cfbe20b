//! Agent turn input and state types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::message::Message;

/// Input to one agent turn.
///
/// Serializes to the upstream contract
/// `{"messages": [...], "is_last_step": bool, "today_datetime": "<ISO-8601>"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentInput {
    /// Conversation so far, ending with the new user message
    pub messages: Vec<Message>,

    /// Marks the turn as the first after a fresh start or reset
    #[serde(default)]
    pub is_last_step: bool,

    #[serde(default = "Utc::now")]
    pub today_datetime: DateTime<Utc>,
}

impl AgentInput {
    /// Input for a single stateless turn: one user message, `is_last_step` set.
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(text)],
            is_last_step: true,
            today_datetime: Utc::now(),
        }
    }
}

/// The running conversation of a turn as seen by the executor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentState {
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl AgentState {
    /// The most recent message, if any.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_turn_input_is_first_step() {
        let input = AgentInput::single("hello");
        assert!(input.is_last_step);
        assert_eq!(input.messages.len(), 1);
        assert_eq!(input.messages[0].content, "hello");
    }

    #[test]
    fn input_serializes_upstream_keys() {
        let value = serde_json::to_value(AgentInput::single("hi")).unwrap();
        assert!(value["messages"].is_array());
        assert_eq!(value["is_last_step"], true);
        assert!(value["today_datetime"].is_string());
    }

    #[test]
    fn state_last_message() {
        let state = AgentState {
            messages: vec![Message::user("q"), Message::assistant("a")],
        };
        assert_eq!(state.last().unwrap().content, "a");
        assert!(AgentState::default().last().is_none());
    }
}
