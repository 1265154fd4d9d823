//! chatgpt-handoff: MCP server that hands a prompt off to ChatGPT
//!
//! The server exposes a single tool, `handoff_to_chatgpt`. Calling it copies
//! the prompt to the system clipboard and, when the prompt is short enough,
//! opens ChatGPT in the browser with the prompt pre-filled. The calling
//! assistant then waits for the user to paste ChatGPT's answer back.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading and validation
//! - [`error`] — Error types
//! - [`handoff`] — The handoff tool, deeplinks and OS side effects
//! - [`mcp`] — MCP protocol implementation (stdio and HTTP)

pub mod config;
pub mod error;
pub mod handoff;
pub mod mcp;
