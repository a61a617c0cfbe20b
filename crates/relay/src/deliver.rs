//! Driving a chunk stream into a sink.

use futures::{Stream, StreamExt};
use mcplink_core::{AgentState, Chunk, Error};
use thiserror::Error;
use tracing::debug;
use crate::classify::{Classified, Surface, classify};
use crate::sink::{OutputSink, SinkError};

/// What a completed relay saw.
#[derive(Debug, Default)]
pub struct RelayOutcome {
    /// State carried by the last end-of-turn chunk, if any arrived.
    pub final_state: Option<AgentState>,
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{0}")]
    Upstream(Error),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Relay every chunk into `sink` in order, as `surface` dictates.
///
/// Stops at the first upstream error or sink failure; dropping the stream at
/// that point stops the producer.
pub async fn relay<S, O>(chunks: S, sink: &mut O, surface: Surface) -> Result<RelayOutcome, RelayError>
where
    S: Stream<Item = Result<Chunk, Error>>,
    O: OutputSink + ?Sized,
{
    let mut chunks = std::pin::pin!(chunks);
    let mut outcome = RelayOutcome::default();

    while let Some(item) = chunks.next().await {
        let chunk = item.map_err(RelayError::Upstream)?;
        match classify(&chunk, surface) {
            Classified::Text(text) if !text.is_empty() => sink.emit(&text).await?,
            Classified::ToolTrace(trace) => sink.emit(&trace).await?,
            Classified::EndOfTurn => sink.emit_newline().await?,
            Classified::Text(_) | Classified::Nothing => {}
        }
        if let Chunk::EndOfTurn(state) = chunk {
            debug!(messages = state.messages.len(), "Turn finished");
            outcome.final_state = Some(state);
        }
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{BufferSink, ChannelSink};
    use futures::stream;
    use mcplink_core::error::ProviderError;
    use mcplink_core::message::{Message, MessageToolCall};
    use tokio::sync::mpsc;

    fn turn() -> Vec<Result<Chunk, Error>> {
        let asking = Message::assistant("").with_tool_calls(vec![MessageToolCall {
            id: "c1".into(),
            name: "lookup".into(),
            arguments: r#"{"q":"rust"}"#.into(),
        }]);
        let done = AgentState {
            messages: vec![Message::user("q"), Message::assistant("Found\nit")],
        };
        vec![
            Ok(Chunk::ValuesSnapshot(AgentState {
                messages: vec![Message::user("q"), asking],
            })),
            Ok(Chunk::assistant_text("Found\n")),
            Ok(Chunk::assistant_text("")),
            Ok(Chunk::assistant_text("it")),
            Ok(Chunk::EndOfTurn(done)),
        ]
    }

    #[tokio::test]
    async fn interactive_shows_trace_text_and_newline() {
        let mut sink = BufferSink::new();
        let outcome = relay(stream::iter(turn()), &mut sink, Surface::Interactive).await.unwrap();
        let out = sink.into_string();
        assert!(out.contains("lookup (c1)"));
        assert!(out.ends_with("    q: rust\nFound\nit\n"));
        assert_eq!(outcome.final_state.unwrap().last().unwrap().content, "Found\nit");
    }

    #[tokio::test]
    async fn rest_relays_text_only_with_newlines() {
        let mut sink = BufferSink::new();
        relay(stream::iter(turn()), &mut sink, Surface::Rest).await.unwrap();
        assert_eq!(sink.as_str(), "Found\nit");
    }

    #[tokio::test]
    async fn upstream_error_stops_relay() {
        let chunks = vec![
            Ok(Chunk::assistant_text("partial")),
            Err(Error::Provider(ProviderError::StreamInterrupted("reset".into()))),
            Ok(Chunk::assistant_text("never")),
        ];
        let mut sink = BufferSink::new();
        let err = relay(stream::iter(chunks), &mut sink, Surface::Rest).await.unwrap_err();
        assert!(matches!(err, RelayError::Upstream(_)));
        assert_eq!(sink.as_str(), "partial");
    }

    #[tokio::test]
    async fn closed_sink_stops_relay() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let mut sink = ChannelSink::new(tx);
        let err = relay(stream::iter(turn()), &mut sink, Surface::Rest).await.unwrap_err();
        assert!(matches!(err, RelayError::Sink(SinkError::Closed)));
    }
}
