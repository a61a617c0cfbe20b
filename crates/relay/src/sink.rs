//! Output sinks: where relayed text ends up.

use async_trait::async_trait;
use std::io::{self, Write};
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("output write failed: {0}")]
    Io(#[from] io::Error),

    #[error("output receiver closed")]
    Closed,
}

/// A destination for relayed text.
#[async_trait]
pub trait OutputSink: Send {
    /// Write a fragment as-is.
    async fn emit(&mut self, text: &str) -> Result<(), SinkError>;

    /// End the current line.
    async fn emit_newline(&mut self) -> Result<(), SinkError>;
}

/// Writes to a terminal (stdout by default), flushing after every write so
/// fragments appear as they arrive.
pub struct TerminalSink<W: Write + Send = io::Stdout> {
    out: W,
}

impl TerminalSink {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write + Send> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[async_trait]
impl<W: Write + Send> OutputSink for TerminalSink<W> {
    async fn emit(&mut self, text: &str) -> Result<(), SinkError> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    async fn emit_newline(&mut self) -> Result<(), SinkError> {
        self.emit("\n").await
    }
}

/// Sends each fragment down a channel; used for streaming HTTP bodies.
pub struct ChannelSink {
    tx: mpsc::Sender<String>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<String>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl OutputSink for ChannelSink {
    async fn emit(&mut self, text: &str) -> Result<(), SinkError> {
        self.tx.send(text.to_string()).await.map_err(|_| SinkError::Closed)
    }

    async fn emit_newline(&mut self) -> Result<(), SinkError> {
        self.emit("\n").await
    }
}

/// Collects everything into a string.
#[derive(Debug, Default)]
pub struct BufferSink {
    buf: String,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

#[async_trait]
impl OutputSink for BufferSink {
    async fn emit(&mut self, text: &str) -> Result<(), SinkError> {
        self.buf.push_str(text);
        Ok(())
    }

    async fn emit_newline(&mut self) -> Result<(), SinkError> {
        self.buf.push('\n');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn terminal_sink_writes_verbatim() {
        let mut sink = TerminalSink::new(Vec::new());
        sink.emit("Hel").await.unwrap();
        sink.emit("lo").await.unwrap();
        sink.emit_newline().await.unwrap();
        assert_eq!(sink.into_inner(), b"Hello\n");
    }

    #[tokio::test]
    async fn channel_sink_reports_closed_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut sink = ChannelSink::new(tx);
        sink.emit("a").await.unwrap();
        assert_eq!(rx.recv().await.as_deref(), Some("a"));

        drop(rx);
        assert!(matches!(sink.emit("b").await, Err(SinkError::Closed)));
    }

    #[tokio::test]
    async fn buffer_sink_collects() {
        let mut sink = BufferSink::new();
        sink.emit("x").await.unwrap();
        sink.emit_newline().await.unwrap();
        assert_eq!(sink.as_str(), "x\n");
    }
}
