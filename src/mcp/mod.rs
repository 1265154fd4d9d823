//! Model Context Protocol (MCP) server implementation.
//!
//! This module exposes the ChatGPT handoff tool to AI assistants over
//! JSON-RPC 2.0, on either of two transports that share one dispatcher.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         MCP Server                          │
//! │                                                             │
//! │   ┌─────────────┐                                           │
//! │   │   stdio     │──┐                                        │
//! │   └─────────────┘  │  ┌─────────────┐    ┌─────────────┐    │
//! │                    ├─▶│  McpServer  │───▶│  Handoff    │    │
//! │   ┌─────────────┐  │  │ (dispatch)  │    │   tool      │    │
//! │   │ HTTP (axum) │──┘  └─────────────┘    └─────────────┘    │
//! │   └─────────────┘                                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! `initialize` always reports MCP protocol version 2025-06-18.

pub mod http;
pub mod protocol;
pub mod server;
pub mod transport;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};
pub use server::{Dispatch, McpServer};
pub use transport::StdioTransport;
