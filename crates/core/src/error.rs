//! Error types for the mcplink domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all mcplink operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Tool catalog errors ---
    #[error("{0}")]
    ToolLoad(#[from] ToolLoadError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout_secs}s")]
    Timeout { tool_name: String, timeout_secs: u64 },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

/// Failure while turning configured tool servers into tool descriptors.
///
/// Always names the server so the HTTP and CLI surfaces can report the cause.
#[derive(Debug, Clone, Error)]
pub enum ToolLoadError {
    #[error("failed to start tool server '{server}': {reason}")]
    Spawn { server: String, reason: String },

    #[error("tool server '{server}' failed to initialize: {reason}")]
    Handshake { server: String, reason: String },

    #[error("failed to list tools from '{server}': {reason}")]
    ListTools { server: String, reason: String },
}

impl ToolLoadError {
    /// The configured name of the server that failed.
    pub fn server(&self) -> &str {
        match self {
            Self::Spawn { server, .. }
            | Self::Handshake { server, .. }
            | Self::ListTools { server, .. } => server,
        }
    }
}
