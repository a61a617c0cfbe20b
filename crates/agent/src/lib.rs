//! The agent executor: the tool-calling loop behind every chat turn.
//!
//! One turn runs as a single spawned task:
//!
//! 1. **Receive** the conversation plus `is_last_step` and `today_datetime`
//! 2. **Send to LLM** with the system prompt and every catalog tool
//! 3. **Stream** assistant text out as [`Chunk::MessageDelta`]s
//! 4. **If tool calls**: execute them, emit results, loop back to step 2
//! 5. **Otherwise**: emit [`Chunk::EndOfTurn`] with the final state
//!
//! [`Chunk::MessageDelta`]: mcplink_core::Chunk::MessageDelta
//! [`Chunk::EndOfTurn`]: mcplink_core::Chunk::EndOfTurn

pub mod executor;
pub mod factory;
pub mod prompt;
pub mod tool_calling;

#[cfg(test)]
mod test_helpers;

pub use executor::{AgentExecutor, ChunkStream};
pub use factory::{AgentFactory, McpAgentFactory};
pub use tool_calling::ToolCallingAgent;
