//! Chunks: the units of output an agent executor emits during one turn.
//!
//! On the wire a chunk is one of three loosely-typed shapes:
//!
//! - `["messages", [<delta>, <metadata>]]`: a partial message for one streaming step
//! - `["values", {"messages": [...]}]`: a snapshot of the running turn state
//! - `{"messages": [...]}`: the final state of the turn
//!
//! [`Chunk::from_value`] classifies a raw shape once. Anything unrecognised
//! becomes [`Chunk::Unknown`] rather than an error.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value, json};
use crate::agent::AgentState;
use crate::message::Role;

const MESSAGES_TAG: &str = "messages";
const VALUES_TAG: &str = "values";

/// One unit of agent output.
#[derive(Debug, Clone)]
pub enum Chunk {
    /// Partial output for one streaming step.
    MessageDelta(MessageDelta),
    /// Intermediate snapshot of the running conversation.
    ValuesSnapshot(AgentState),
    /// Final conversation state; the turn is over.
    EndOfTurn(AgentState),
    /// A shape this crate does not understand.
    Unknown(Value),
}

/// A partial message: who produced it and what it says.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDelta {
    #[serde(default = "default_delta_role")]
    pub role: Role,
    #[serde(default)]
    pub content: DeltaContent,
}

fn default_delta_role() -> Role {
    Role::Assistant
}

/// Delta payload: a plain string or an ordered list of content parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeltaContent {
    Text(String),
    Parts(#[serde(deserialize_with = "mapping_parts")] Vec<ContentPart>),
}

impl Default for DeltaContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// Parts that are not mappings are dropped one by one.
fn mapping_parts<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<ContentPart>, D::Error> {
    let raw = Vec::<Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|part| ContentPart::deserialize(part).ok())
        .collect())
}

fn string_only<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// One content part. Only parts carrying a string `text` contribute display
/// text; everything else (tool-use blocks, images) rides along in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type", default, deserialize_with = "string_only", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "string_only", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: Some("text".into()),
            text: Some(text.into()),
            extra: Map::new(),
        }
    }
}

impl Chunk {
    /// An assistant text delta.
    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self::MessageDelta(MessageDelta {
            role: Role::Assistant,
            content: DeltaContent::Text(text.into()),
        })
    }

    /// Classify a raw upstream value.
    pub fn from_value(value: Value) -> Self {
        Self::classify(&value).unwrap_or(Self::Unknown(value))
    }

    fn classify(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) if items.len() == 2 => match (items[0].as_str()?, &items[1]) {
                (MESSAGES_TAG, Value::Array(payload)) => {
                    let delta = MessageDelta::deserialize(payload.first()?).ok()?;
                    Some(Self::MessageDelta(delta))
                }
                (VALUES_TAG, state @ Value::Object(_)) => {
                    AgentState::deserialize(state).ok().map(Self::ValuesSnapshot)
                }
                _ => None,
            },
            Value::Object(map) if map.contains_key(MESSAGES_TAG) => {
                AgentState::deserialize(value).ok().map(Self::EndOfTurn)
            }
            _ => None,
        }
    }

    /// The wire shape of this chunk.
    pub fn to_value(&self) -> Value {
        match self {
            Self::MessageDelta(delta) => json!([MESSAGES_TAG, [delta, {}]]),
            Self::ValuesSnapshot(state) => json!([VALUES_TAG, state]),
            Self::EndOfTurn(state) => json!(state),
            Self::Unknown(value) => value.clone(),
        }
    }
}

impl Serialize for Chunk {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Chunk {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}
