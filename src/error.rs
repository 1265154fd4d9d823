//! Error types for chatgpt-handoff.
//!
//! Errors are split by layer: configuration loading, the platform side-effect
//! adapter, and the handoff tool itself. None of them escape a single request;
//! the MCP front-end turns tool errors into `isError` results.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Errors raised by the clipboard and browser side effects.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Neither supported clipboard utility is installed.
    #[error("no clipboard utility found (install xclip or xsel)")]
    NoClipboardUtility,

    /// None of the known browser launchers is installed.
    #[error("no suitable browser found")]
    NoBrowser,

    /// The external command could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program that was launched.
        program: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The payload could not be written to the command's stdin.
    #[error("failed to write to {program}: {source}")]
    Stdin {
        /// Program whose stdin was written.
        program: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The external command ran but reported failure.
    #[error("{program} exited with {status}")]
    ExitStatus {
        /// Program that failed.
        program: String,
        /// Its exit status.
        status: ExitStatus,
    },
}

/// Errors returned by the `handoff_to_chatgpt` tool.
#[derive(Error, Debug)]
pub enum HandoffError {
    /// The prompt was empty or whitespace only.
    #[error("prompt is required")]
    PromptRequired,

    /// Copying the prompt to the clipboard failed.
    #[error("failed to copy prompt to clipboard: {0}")]
    Clipboard(#[source] PlatformError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let error = ConfigError::NotFound {
            path: PathBuf::from("/path/to/config.json"),
        };
        let msg = error.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("config.json"));
    }

    #[test]
    fn validation_error_display() {
        let error = ConfigError::ValidationError {
            message: "invalid setting".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("invalid setting"));
    }

    #[test]
    fn no_clipboard_utility_names_both_tools() {
        let msg = PlatformError::NoClipboardUtility.to_string();
        assert!(msg.contains("xclip"));
        assert!(msg.contains("xsel"));
    }

    #[test]
    fn clipboard_error_wraps_cause() {
        let error = HandoffError::Clipboard(PlatformError::NoClipboardUtility);
        assert_eq!(
            error.to_string(),
            "failed to copy prompt to clipboard: no clipboard utility found (install xclip or xsel)"
        );
    }

    #[test]
    fn prompt_required_message() {
        assert_eq!(HandoffError::PromptRequired.to_string(), "prompt is required");
    }
}
