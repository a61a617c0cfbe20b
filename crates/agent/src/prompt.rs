//! System prompt assembly.

use chrono::{DateTime, Utc};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. \
Tools from the connected MCP servers are available to you; call them when they help \
answer the user's request and answer directly when they do not. \
When a tool fails, say so instead of guessing its result.";

/// The system message for one turn: the configured (or default) prompt
/// followed by the current time.
pub fn system_prompt(base: Option<&str>, now: DateTime<Utc>) -> String {
    format!(
        "{}\n\nSystem time: {}",
        base.unwrap_or(DEFAULT_SYSTEM_PROMPT).trim_end(),
        now.to_rfc3339()
    )
}
