//! Whole-turn aggregation for non-streaming responses.

use futures::{Stream, StreamExt};
use mcplink_core::{Chunk, Error};
use serde_json::Value;
use tracing::error;
use crate::classify::{Classified, Surface, classify};

const FENCE_OPEN: &str = "```json";
const FENCE_CLOSE: &str = "```";

/// Collects the display text of one turn into a single string.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    strip_newlines: bool,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self { strip_newlines: true }
    }
}

impl Aggregator {
    pub fn new(strip_newlines: bool) -> Self {
        Self { strip_newlines }
    }

    /// Concatenate every text fragment of the turn.
    ///
    /// Never fails: an upstream error is logged and yields an empty string,
    /// discarding any text already collected.
    pub async fn collect<S>(&self, chunks: S) -> String
    where
        S: Stream<Item = Result<Chunk, Error>>,
    {
        let mut chunks = std::pin::pin!(chunks);
        let mut out = String::new();
        while let Some(item) = chunks.next().await {
            let chunk = match item {
                Ok(chunk) => chunk,
                Err(e) => {
                    error!(error = %e, "Agent turn failed during aggregation");
                    return String::new();
                }
            };
            if let Classified::Text(text) = classify(&chunk, Surface::Rest) {
                self.push_fragment(&mut out, &text);
            }
        }
        out
    }

    fn push_fragment(&self, out: &mut String, fragment: &str) {
        if self.strip_newlines {
            out.extend(fragment.chars().filter(|&c| c != '\n'));
        } else {
            out.push_str(fragment);
        }
    }
}

/// Strip a surrounding ```` ```json ```` fence, if there is one.
pub fn unwrap_fence(s: &str) -> &str {
    match s.strip_prefix(FENCE_OPEN).and_then(|rest| rest.strip_suffix(FENCE_CLOSE)) {
        Some(inner) => inner.trim(),
        None => s,
    }
}

/// The response body for an aggregated turn: parsed JSON when the text is
/// JSON (fenced or not), otherwise the text as a JSON string.
pub fn parse_response(s: &str) -> Value {
    let text = unwrap_fence(s);
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
