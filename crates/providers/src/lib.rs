//! LLM provider implementations for mcplink.
//!
//! Every backend is reached through its OpenAI-compatible
//! `/chat/completions` endpoint; [`build_provider`] picks the base URL and
//! key from configuration.

pub mod build;
pub mod openai_compat;

pub use build::{build_provider, default_base_url};
pub use openai_compat::OpenAiCompatProvider;
