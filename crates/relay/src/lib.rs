//! Turning an agent's chunk stream into something a person or client reads.
//!
//! - [`classify`]: decides what, if anything, each chunk contributes
//! - [`trace`]: the human-readable tool-call block shown in the terminal
//! - [`aggregate`]: collects a whole turn into one response (REST, non-streaming)
//! - [`deliver`]: drives a chunk stream into an [`OutputSink`]
//! - [`sink`]: terminal, channel and buffer outputs

pub mod aggregate;
pub mod classify;
pub mod deliver;
pub mod sink;
pub mod trace;

pub use aggregate::{Aggregator, parse_response, unwrap_fence};
pub use classify::{Classified, Surface, classify, extract_text};
pub use deliver::{RelayError, RelayOutcome, relay};
pub use sink::{BufferSink, ChannelSink, OutputSink, SinkError, TerminalSink};
pub use trace::format_tool_calls;
