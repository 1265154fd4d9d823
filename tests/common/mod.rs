//! Shared test fixtures.

#![allow(dead_code)] // Not every test binary uses every helper

use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use chatgpt_handoff::error::PlatformError;
use chatgpt_handoff::handoff::{Platform, DEFAULT_MAX_LENGTH};
use chatgpt_handoff::mcp::McpServer;
use tokio::io::{AsyncRead, ReadBuf};

/// Platform double that records every side effect.
#[derive(Default)]
pub struct RecordingPlatform {
    pub clipboard_fails: bool,
    pub browser_fails: bool,
    pub copied: Mutex<Vec<String>>,
    pub opened: Mutex<Vec<String>>,
}

impl RecordingPlatform {
    pub fn copied(&self) -> Vec<String> {
        self.copied.lock().unwrap().clone()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl Platform for RecordingPlatform {
    fn copy_to_clipboard(&self, text: &str) -> Result<(), PlatformError> {
        self.copied.lock().unwrap().push(text.to_string());
        if self.clipboard_fails {
            Err(PlatformError::NoClipboardUtility)
        } else {
            Ok(())
        }
    }

    fn open_url(&self, url: &str) -> Result<(), PlatformError> {
        self.opened.lock().unwrap().push(url.to_string());
        if self.browser_fails {
            Err(PlatformError::NoBrowser)
        } else {
            Ok(())
        }
    }
}

/// Builds a server around `platform` with the default deeplink limit.
pub fn server_with(platform: RecordingPlatform) -> (Arc<McpServer>, Arc<RecordingPlatform>) {
    let platform = Arc::new(platform);
    let server = Arc::new(McpServer::new(platform.clone(), DEFAULT_MAX_LENGTH));
    (server, platform)
}

/// Builds a server whose side effects all succeed.
pub fn server() -> (Arc<McpServer>, Arc<RecordingPlatform>) {
    server_with(RecordingPlatform::default())
}

/// A `tools/call` request for the handoff tool.
pub fn handoff_call(id: i64, prompt: &str) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {
            "name": "handoff_to_chatgpt",
            "arguments": {"prompt": prompt}
        }
    })
    .to_string()
}

/// Reader whose every read fails, like a stdin that has gone away.
pub struct FailingReader;

impl AsyncRead for FailingReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdin gone")))
    }
}
