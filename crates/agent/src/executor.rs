//! The executor seam between the agent loop and its consumers.

use futures::Stream;
use mcplink_core::{AgentInput, Chunk, Error};
use std::pin::Pin;

/// Chunks of one turn, in emission order. An `Err` item ends the turn.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Chunk, Error>> + Send>>;

/// Runs one agent turn.
///
/// `stream` never fails up front; failures arrive as stream items. Dropping
/// the stream stops the turn at its next emission.
pub trait AgentExecutor: Send + Sync {
    fn stream(&self, input: AgentInput) -> ChunkStream;
}
