//! MCP client errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum McpError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON-RPC message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("server error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("server closed the connection")]
    Closed,

    #[error("response to '{0}' carried no result")]
    MissingResult(String),
}
