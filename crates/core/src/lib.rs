//! # mcplink Core
//!
//! Domain types, traits, and error definitions shared by every mcplink crate.
//! This crate has **zero framework dependencies**: the provider, tool, and
//! agent-output abstractions live here and the other crates implement them.
//!
//! The central type is [`Chunk`], the unit of output an agent executor emits
//! during a turn. Raw upstream shapes are classified into a `Chunk` exactly
//! once, at the boundary, so downstream code matches on variants instead of
//! probing JSON.

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;
pub mod agent;
pub mod chunk;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{Message, Role, Conversation, MessageToolCall};
pub use provider::{Provider, ProviderRequest, ProviderResponse, StreamChunk, ToolDefinition};
pub use tool::{Tool, ToolCall, ToolResult, ToolRegistry};
pub use agent::{AgentInput, AgentState};
pub use chunk::{Chunk, ContentPart, DeltaContent, MessageDelta};
