//! Async stream log readers (non-UTF8-safe).
//!
//! llama-server can emit non-UTF8 bytes on stdout/stderr. `BufReader::lines()`
//! would end the reader on invalid UTF-8, so lines are read as bytes and
//! decoded lossily.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::debug;

/// Number of stderr lines kept for failure reports.
const TAIL_LINES: usize = 20;

/// Ring buffer of the most recent lines of a stream.
#[derive(Debug, Clone, Default)]
pub struct OutputTail {
    lines: Arc<Mutex<VecDeque<String>>>,
}

impl OutputTail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, line: String) {
        let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        if lines.len() >= TAIL_LINES {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    /// The retained lines joined by newlines, or `None` if nothing was captured.
    pub fn snapshot(&self) -> Option<String> {
        let lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        if lines.is_empty() {
            return None;
        }
        Some(lines.iter().cloned().collect::<Vec<_>>().join("\n"))
    }
}

/// Forward each line of `stream` to `tracing` at debug level, optionally
/// keeping a tail of it.
pub fn spawn_stream_reader(
    stream: impl AsyncRead + Unpin + Send + 'static,
    pid: u32,
    stream_type: &'static str,
    tail: Option<OutputTail>,
) {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf: Vec<u8> = Vec::with_capacity(1024);

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                        if buf.last() == Some(&b'\r') {
                            buf.pop();
                        }
                    }

                    let line = String::from_utf8_lossy(&buf).into_owned();
                    debug!(pid = %pid, %stream_type, "{}", line);
                    if let Some(ref tail) = tail {
                        tail.push(line);
                    }
                }
                Err(e) => {
                    debug!(pid = %pid, %stream_type, error = %e, "log stream reader exiting due to read error");
                    break;
                }
            }
        }

        debug!(pid = %pid, %stream_type, "log stream reader task exiting");
    });
}
