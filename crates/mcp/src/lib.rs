//! Model Context Protocol (MCP) support for mcplink.
//!
//! Spawns each configured tool server as a child process, speaks
//! newline-delimited JSON-RPC 2.0 over its stdio, and wraps every advertised
//! tool so the agent can call it through the core `Tool` trait.
//!
//! - [`transport`]: JSON-RPC framing over a child's stdin/stdout
//! - [`client`]: handshake, tool discovery, tool calls
//! - [`tool`]: adapter from an MCP tool to `mcplink_core::Tool`
//! - [`catalog`]: loads every configured server into one `ToolRegistry`

pub mod catalog;
pub mod client;
pub mod env;
pub mod error;
pub mod tool;
pub mod transport;
pub mod types;

pub use catalog::ToolCatalog;
pub use client::McpClient;
pub use error::McpError;
pub use tool::McpTool;
pub use transport::StdioTransport;

/// Protocol revision sent in `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";
