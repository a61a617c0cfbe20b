//! Prompted line input that survives Ctrl-C.

use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

/// One read from the terminal.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    /// A line with surrounding whitespace trimmed.
    Line(String),
    /// Ctrl-C arrived while waiting.
    Interrupted,
    /// End of input.
    Eof,
}

pub struct LineReader<R> {
    lines: Lines<R>,
}

impl LineReader<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self { lines: reader.lines() }
    }

    /// Print `prompt` and wait for a line or Ctrl-C.
    pub async fn read(&mut self, prompt: &str) -> io::Result<Input> {
        print!("{prompt}");
        io::stdout().flush()?;

        tokio::select! {
            line = self.lines.next_line() => Ok(match line? {
                Some(line) => Input::Line(line.trim().to_string()),
                None => Input::Eof,
            }),
            _ = tokio::signal::ctrl_c() => Ok(Input::Interrupted),
        }
    }
}
