//! JSON-RPC 2.0 over newline-delimited stdio.
//!
//! One request is in flight at a time: the pipes are locked from write until
//! the matching response is read. Server notifications, server-initiated
//! requests, stale responses and non-JSON lines are skipped.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};
use crate::error::McpError;

#[derive(Serialize)]
struct Outgoing<'a> {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

#[derive(Deserialize)]
struct Incoming {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

type BoxedReader = BufReader<Box<dyn AsyncRead + Send + Unpin>>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

struct Pipes {
    reader: BoxedReader,
    writer: BoxedWriter,
}

impl Pipes {
    async fn send(&mut self, message: &Outgoing<'_>) -> Result<(), McpError> {
        let mut line = serde_json::to_string(message)?;
        trace!(message = %line, "MCP send");
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

/// Stdio transport to one MCP server.
pub struct StdioTransport {
    pipes: Mutex<Pipes>,
    next_id: AtomicU64,
    // Held so the process lives as long as the transport; killed on drop.
    _child: Option<Child>,
}

impl StdioTransport {
    /// Spawn `command` with piped stdin/stdout. Stderr passes through.
    pub fn spawn(command: &str, args: &[String], env: &[(String, String)]) -> Result<Self, McpError> {
        let mut child = Command::new(command)
            .args(args)
            .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child.stdin.take().ok_or(McpError::Closed)?;
        let stdout = child.stdout.take().ok_or(McpError::Closed)?;
        debug!(command, pid = child.id(), "Spawned MCP server");

        let mut transport = Self::from_streams(stdout, stdin);
        transport._child = Some(child);
        Ok(transport)
    }

    /// Build a transport over arbitrary byte streams.
    pub fn from_streams<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            pipes: Mutex::new(Pipes {
                reader: BufReader::new(Box::new(reader) as Box<dyn AsyncRead + Send + Unpin>),
                writer: Box::new(writer),
            }),
            next_id: AtomicU64::new(1),
            _child: None,
        }
    }

    /// Send a request and wait for its response.
    pub async fn request(&self, method: &str, params: Option<Value>) -> Result<Value, McpError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut pipes = self.pipes.lock().await;
        pipes
            .send(&Outgoing {
                jsonrpc: "2.0",
                id: Some(id),
                method,
                params,
            })
            .await?;

        let mut line = String::new();
        loop {
            line.clear();
            if pipes.reader.read_line(&mut line).await? == 0 {
                return Err(McpError::Closed);
            }
            let text = line.trim();
            if text.is_empty() {
                continue;
            }

            let incoming: Incoming = match serde_json::from_str(text) {
                Ok(msg) => msg,
                Err(e) => {
                    warn!(error = %e, "Skipping non JSON-RPC output from MCP server");
                    continue;
                }
            };

            if let Some(other) = incoming.method {
                trace!(method = %other, "Skipping server-initiated message");
                continue;
            }
            if incoming.id.as_ref().and_then(Value::as_u64) != Some(id) {
                trace!(expected = id, "Skipping response for another request");
                continue;
            }

            if let Some(err) = incoming.error {
                return Err(McpError::Rpc {
                    code: err.code,
                    message: err.message,
                });
            }
            return incoming
                .result
                .ok_or_else(|| McpError::MissingResult(method.to_string()));
        }
    }

    /// Send a notification (no response expected).
    pub async fn notify(&self, method: &str, params: Option<Value>) -> Result<(), McpError> {
        self.pipes
            .lock()
            .await
            .send(&Outgoing {
                jsonrpc: "2.0",
                id: None,
                method,
                params,
            })
            .await
    }
}
