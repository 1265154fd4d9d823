//! The `handoff_to_chatgpt` tool.
//!
//! A handoff runs in two phases with different failure policies:
//!
//! 1. **Clipboard** (required): the prompt is copied to the clipboard. If this
//!    fails the whole call fails.
//! 2. **Browser** (best-effort): if the deeplink is short enough it is opened.
//!    Failures are logged and otherwise ignored.
//!
//! The clipboard and the deeplink both receive the prompt exactly as sent;
//! trimming is only used to reject blank prompts.

pub mod deeplink;
pub mod platform;

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::HandoffError;

pub use deeplink::{Deeplink, DEFAULT_MAX_LENGTH};
pub use platform::{OsFamily, Platform, SystemPlatform};

/// Registered tool name.
pub const TOOL_NAME: &str = "handoff_to_chatgpt";

/// Tool description shown to the calling model.
pub const TOOL_DESCRIPTION: &str = "Hand off a research or debugging prompt to ChatGPT. \
Write detailed, specific prompts that include all necessary context. \
After calling this tool, you should stop and wait for the user to relay ChatGPT's response back to you.\n\n\
Example uses:\n\
1. Research: \"Research the latest developments in WebAssembly performance optimizations, \
focusing on 2024-2025 improvements and real-world benchmarks\"\n\
2. Debugging: \"Debug this Go memory leak issue: [include relevant code snippets, error messages, \
and context about when the issue occurs]\"";

/// Text returned on success.
pub const CONFIRMATION: &str = "Request sent. Now wait for the user to share ChatGPT's response.";

/// JSON Schema for the tool's arguments.
#[must_use]
pub fn input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "prompt": {
                "type": "string",
                "minLength": 1,
                "description": "The prompt to send to ChatGPT"
            }
        },
        "required": ["prompt"],
        "additionalProperties": false
    })
}

/// Arguments of a handoff call.
///
/// A missing `prompt` deserialises as empty and is rejected by
/// [`HandoffTool::handle`] like any other blank prompt.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HandoffInput {
    /// The prompt to hand off.
    #[serde(default)]
    pub prompt: String,
}

/// What happened in the browser phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserLaunch {
    /// The deeplink was opened.
    Opened,
    /// Opening was attempted and failed.
    Failed,
    /// The deeplink was too long to try.
    Skipped,
}

/// A completed handoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffOutcome {
    /// Text for the caller.
    pub message: &'static str,
    /// Result of the browser phase.
    pub browser: BrowserLaunch,
}

/// Executes handoffs against a [`Platform`].
#[derive(Clone)]
pub struct HandoffTool {
    platform: Arc<dyn Platform>,
    max_deeplink_length: usize,
}

impl std::fmt::Debug for HandoffTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandoffTool")
            .field("max_deeplink_length", &self.max_deeplink_length)
            .finish_non_exhaustive()
    }
}

impl HandoffTool {
    /// Creates a tool that opens deeplinks up to `max_deeplink_length` characters.
    #[must_use]
    pub fn new(platform: Arc<dyn Platform>, max_deeplink_length: usize) -> Self {
        Self {
            platform,
            max_deeplink_length,
        }
    }

    /// Runs a handoff.
    ///
    /// # Errors
    ///
    /// Returns [`HandoffError::PromptRequired`] for a blank prompt and
    /// [`HandoffError::Clipboard`] if the clipboard write fails. Browser
    /// failures are never returned.
    pub fn handle(&self, input: &HandoffInput) -> Result<HandoffOutcome, HandoffError> {
        let prompt = input.prompt.as_str();
        if prompt.trim().is_empty() {
            return Err(HandoffError::PromptRequired);
        }

        self.copy_prompt(prompt)?;
        let browser = self.open_deeplink(prompt);

        tracing::info!(
            prompt_chars = prompt.chars().count(),
            browser = ?browser,
            "Prompt handed off"
        );

        Ok(HandoffOutcome {
            message: CONFIRMATION,
            browser,
        })
    }

    fn copy_prompt(&self, prompt: &str) -> Result<(), HandoffError> {
        self.platform.copy_to_clipboard(prompt).map_err(|e| {
            tracing::warn!(error = %e, "Clipboard write failed");
            HandoffError::Clipboard(e)
        })
    }

    fn open_deeplink(&self, prompt: &str) -> BrowserLaunch {
        let link = Deeplink::build(prompt);
        if !link.fits_within(self.max_deeplink_length) {
            tracing::debug!(
                length = link.len(),
                max = self.max_deeplink_length,
                "Deeplink too long, not opening browser"
            );
            return BrowserLaunch::Skipped;
        }

        match self.platform.open_url(link.as_str()) {
            Ok(()) => BrowserLaunch::Opened,
            Err(e) => {
                tracing::debug!(error = %e, "Browser launch failed, ignoring");
                BrowserLaunch::Failed
            }
        }
    }
}
