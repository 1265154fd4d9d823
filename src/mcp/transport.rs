//! stdio transport for MCP server.
//!
//! This module implements the stdio transport as specified by MCP:
//!
//! - Messages are UTF-8 encoded JSON-RPC
//! - Messages are delimited by newlines
//! - Messages must not contain embedded newlines
//! - stdin: receives messages from client
//! - stdout: sends messages to client
//! - stderr: may be used for logging (not MCP messages)
//!
//! The transport is generic over its reader and writer so the same framing
//! can be driven from in-memory buffers.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::mcp::protocol::OutgoingMessage;

/// A line-delimited MCP transport, by default over stdin/stdout.
pub struct StdioTransport<R = tokio::io::Stdin, W = tokio::io::Stdout> {
    /// Buffered reader for incoming messages.
    reader: BufReader<R>,
    /// Sink for outgoing messages.
    writer: W,
}

impl StdioTransport {
    /// Creates a new stdio transport.
    #[must_use]
    pub fn new() -> Self {
        Self::with_io(tokio::io::stdin(), tokio::io::stdout())
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a transport over arbitrary streams.
    #[must_use]
    pub fn with_io(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
        }
    }

    /// Returns the underlying writer.
    ///
    /// Lets callers that drive the transport over an in-memory buffer
    /// inspect what was written.
    #[must_use]
    pub const fn writer(&self) -> &W {
        &self.writer
    }

    /// Reads the next message line as raw bytes.
    ///
    /// The line is not checked for UTF-8 here, so a garbled line reaches the
    /// dispatcher (and gets a parse error) instead of failing the read.
    ///
    /// Returns `None` if the input is closed (EOF).
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reader fails.
    pub async fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        let bytes_read = self.reader.read_until(b'\n', &mut line).await?;

        if bytes_read == 0 {
            // EOF - stdin closed
            return Ok(None);
        }

        // Remove the trailing newline
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }

        Ok(Some(line))
    }

    /// Writes a response or error as one newline-terminated line.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn write_message(&mut self, message: &OutgoingMessage) -> io::Result<()> {
        let json = message
            .to_json()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        self.write_raw(&json).await
    }

    /// Writes a raw JSON string with newline termination.
    async fn write_raw(&mut self, json: &str) -> io::Result<()> {
        // stdio framing: messages must not contain embedded newlines
        debug_assert!(
            !json.contains('\n'),
            "JSON message must not contain embedded newlines"
        );

        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;

        Ok(())
    }
}

/// Resolves when the process is asked to terminate.
#[cfg(unix)]
pub(crate) async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigint, mut sigterm) = match (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
    ) {
        (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not install signal handlers");
            return std::future::pending().await;
        }
    };

    tokio::select! {
        _ = sigint.recv() => tracing::info!("Received SIGINT"),
        _ = sigterm.recv() => tracing::info!("Received SIGTERM"),
    }
}

/// Resolves when the process is asked to terminate.
#[cfg(windows)]
pub(crate) async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C"),
        Err(e) => {
            tracing::warn!(error = %e, "Could not install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::{JsonRpcError, JsonRpcResponse, RequestId};

    #[test]
    fn transport_default() {
        // Just ensure Default is implemented and doesn't panic
        let _transport = StdioTransport::default();
    }

    #[tokio::test]
    async fn reads_lines_and_strips_terminators() {
        let input: &[u8] = b"first\r\nsecond\nlast";
        let mut transport = StdioTransport::with_io(input, Vec::new());

        assert_eq!(transport.read_line().await.unwrap().as_deref(), Some(&b"first"[..]));
        assert_eq!(transport.read_line().await.unwrap().as_deref(), Some(&b"second"[..]));
        assert_eq!(transport.read_line().await.unwrap().as_deref(), Some(&b"last"[..]));
        assert_eq!(transport.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn invalid_utf8_line_is_returned_as_is() {
        let input: &[u8] = b"\xff\xfe\nnext\n";
        let mut transport = StdioTransport::with_io(input, Vec::new());

        assert_eq!(
            transport.read_line().await.unwrap().as_deref(),
            Some(&[0xff, 0xfe][..])
        );
        assert_eq!(transport.read_line().await.unwrap().as_deref(), Some(&b"next"[..]));
    }

    #[tokio::test]
    async fn writes_one_line_per_message() {
        let input: &[u8] = b"";
        let mut transport = StdioTransport::with_io(input, Vec::new());

        let response = JsonRpcResponse::success(
            RequestId::from(1),
            serde_json::json!({
                "message": "hello\nworld",
                "nested": {"key": "value"}
            }),
        );
        transport.write_message(&response.into()).await.unwrap();
        transport
            .write_message(&JsonRpcError::parse_error().into())
            .await
            .unwrap();

        let written = String::from_utf8(transport.writer().clone()).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(written.ends_with('\n'));
        assert!(lines[0].contains(r#""id":1"#));
        assert!(lines[1].contains("-32700"));
    }
}
