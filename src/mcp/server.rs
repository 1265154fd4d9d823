//! MCP request dispatch for the ChatGPT handoff server.
//!
//! [`McpServer`] holds no per-session state: every message is handled on its
//! own, so the same instance serves the sequential stdio loop and concurrent
//! HTTP requests. Transports only frame messages and call
//! [`McpServer::handle_message`].
//!
//! Supported methods: `initialize`, `tools/list`, `tools/call`, `ping` and
//! `shutdown`. Anything else is answered with "method not found".

use std::io;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::handoff::{self, HandoffInput, HandoffTool, Platform};
use crate::mcp::protocol::{
    parse_message, IncomingMessage, JsonRpcError, JsonRpcNotification, JsonRpcRequest,
    JsonRpcResponse, OutgoingMessage, RequestId, MCP_PROTOCOL_VERSION, SERVER_NAME,
};
use crate::mcp::transport::{shutdown_signal, StdioTransport};

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    pub tools: ToolCapabilities,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            tools: ToolCapabilities {},
        }
    }
}

/// Tool-specific capabilities. Serialises as `{}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolCapabilities {}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if requires a predicate fn(&T) -> bool, so we must take &bool here
const fn is_false(b: &bool) -> bool {
    !*b
}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Client information received during initialisation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Parameters for the initialize request.
///
/// Only used for logging; the requested version is never checked.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by client.
    #[serde(default)]
    pub protocol_version: Option<String>,
    /// Client information.
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// A tool definition for tools/list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Parameters for tools/call request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments for the tool.
    #[serde(default)]
    pub arguments: Value,
}

/// Content item in a tool call response.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the tool call resulted in an error.
    #[serde(skip_serializing_if = "is_false")]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Creates an error text result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }
}

/// Outcome of handling one inbound message.
#[derive(Debug, Clone)]
pub struct Dispatch {
    /// Message to send back; `None` for notifications.
    pub reply: Option<OutgoingMessage>,
    /// The client asked the server to shut down.
    pub shutdown: bool,
}

impl Dispatch {
    fn respond(message: impl Into<OutgoingMessage>) -> Self {
        Self {
            reply: Some(message.into()),
            shutdown: false,
        }
    }

    const fn silent() -> Self {
        Self {
            reply: None,
            shutdown: false,
        }
    }
}

/// The MCP server exposing the `handoff_to_chatgpt` tool.
#[derive(Debug, Clone)]
pub struct McpServer {
    handoff: HandoffTool,
}

impl McpServer {
    /// Creates a server that performs handoffs through `platform`.
    #[must_use]
    pub fn new(platform: Arc<dyn Platform>, max_deeplink_length: usize) -> Self {
        Self {
            handoff: HandoffTool::new(platform, max_deeplink_length),
        }
    }

    /// Runs the stdio loop until EOF, `shutdown`, or a termination signal.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub async fn run(&self) -> io::Result<()> {
        let mut transport = StdioTransport::new();

        tokio::select! {
            result = self.serve(&mut transport) => result,
            () = shutdown_signal() => {
                tracing::info!("Termination signal received, stopping");
                Ok(())
            }
        }
    }

    /// Serves messages from `transport` one at a time.
    ///
    /// Blank lines are skipped and undecodable lines get a parse error. EOF,
    /// a read failure or a `shutdown` request ends the loop normally.
    ///
    /// Each message is handled on the blocking pool, since tool calls wait on
    /// external commands; the loop stays responsive to a termination signal
    /// meanwhile.
    ///
    /// # Errors
    ///
    /// Returns an error if writing a response fails.
    pub async fn serve<R, W>(&self, transport: &mut StdioTransport<R, W>) -> io::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        loop {
            let line = match transport.read_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    tracing::info!("Input closed, stopping");
                    return Ok(());
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Read failed, stopping");
                    return Ok(());
                }
            };

            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            let server = self.clone();
            let dispatch =
                match tokio::task::spawn_blocking(move || server.handle_bytes(&line)).await {
                    Ok(dispatch) => dispatch,
                    Err(e) => {
                        tracing::error!(error = %e, "Message handler failed");
                        continue;
                    }
                };

            if let Some(reply) = &dispatch.reply {
                transport.write_message(reply).await?;
            }

            if dispatch.shutdown {
                tracing::info!("Shutdown requested by client");
                return Ok(());
            }
        }
    }

    /// Handles one raw message body.
    ///
    /// Bytes that are not UTF-8 are treated as unparseable JSON.
    #[must_use]
    pub fn handle_bytes(&self, raw: &[u8]) -> Dispatch {
        std::str::from_utf8(raw).map_or_else(
            |_| Dispatch::respond(JsonRpcError::parse_error()),
            |text| self.handle_message(text),
        )
    }

    /// Handles one raw JSON-RPC message.
    #[must_use]
    pub fn handle_message(&self, raw: &str) -> Dispatch {
        match parse_message(raw) {
            Ok(IncomingMessage::Request(req)) => self.handle_request(&req),
            Ok(IncomingMessage::Notification(notif)) => self.handle_notification(notif),
            Err(error) => {
                tracing::debug!(code = error.error.code, "Rejected malformed message");
                Dispatch::respond(error)
            }
        }
    }

    /// Handles an incoming request.
    fn handle_request(&self, req: &JsonRpcRequest) -> Dispatch {
        tracing::debug!(id = %req.id, method = %req.method, "Handling request");

        let response = match req.method.as_str() {
            "initialize" => Ok(Self::handle_initialize(req)),
            "tools/list" => Ok(Self::handle_tools_list(req)),
            "tools/call" => self.handle_tools_call(req),
            "ping" => Ok(Self::handle_ping(req)),
            "shutdown" => {
                return Dispatch {
                    reply: Some(JsonRpcResponse::success(req.id.clone(), json!({})).into()),
                    shutdown: true,
                };
            }
            _ => Err(JsonRpcError::method_not_found(req.id.clone(), &req.method)),
        };

        match response {
            Ok(resp) => Dispatch::respond(resp),
            Err(error) => Dispatch::respond(error),
        }
    }

    /// Handles an incoming notification.
    ///
    /// `notifications/*` messages are only logged. Any other method runs as a
    /// request would, with the reply dropped; a `shutdown` still ends stdio.
    fn handle_notification(&self, notif: JsonRpcNotification) -> Dispatch {
        tracing::debug!(method = %notif.method, "Notification received");

        if notif.method.starts_with("notifications/") {
            return Dispatch::silent();
        }

        let req = JsonRpcRequest {
            id: RequestId::Null,
            method: notif.method,
            params: notif.params,
        };

        Dispatch {
            reply: None,
            ..self.handle_request(&req)
        }
    }

    /// Handles the initialize request.
    fn handle_initialize(req: &JsonRpcRequest) -> JsonRpcResponse {
        let params = req
            .params
            .clone()
            .and_then(|p| serde_json::from_value::<InitializeParams>(p).ok());

        if let Some(params) = params {
            let client = params.client_info.as_ref();
            tracing::info!(
                client_name = client.map_or("unknown", |c| c.name.as_str()),
                client_version = client.and_then(|c| c.version.as_deref()).unwrap_or("unknown"),
                requested_version = params.protocol_version.as_deref().unwrap_or("unspecified"),
                "Client initialising"
            );
        }

        let result = json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": ServerCapabilities::default(),
            "serverInfo": ServerInfo::default(),
        });

        JsonRpcResponse::success(req.id.clone(), result)
    }

    /// Handles the tools/list request.
    fn handle_tools_list(req: &JsonRpcRequest) -> JsonRpcResponse {
        let result = json!({
            "tools": Self::get_tool_definitions(),
        });

        JsonRpcResponse::success(req.id.clone(), result)
    }

    /// Handles the tools/call request.
    fn handle_tools_call(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        let params: ToolCallParams = req
            .params
            .as_ref()
            .map(|p| serde_json::from_value(p.clone()))
            .transpose()
            .map_err(|e| {
                JsonRpcError::invalid_params(
                    req.id.clone(),
                    format!("Invalid tool call params: {e}"),
                )
            })?
            .ok_or_else(|| {
                JsonRpcError::invalid_params(req.id.clone(), "Missing tool call params")
            })?;

        let result = match params.name.as_str() {
            handoff::TOOL_NAME => self.call_handoff(req, params.arguments)?,
            _ => {
                return Err(JsonRpcError::method_not_found(
                    req.id.clone(),
                    &params.name,
                ))
            }
        };

        let result_value = serde_json::to_value(&result).map_err(|e| {
            tracing::error!(error = %e, "Failed to serialise tool call result");
            JsonRpcError::internal_error(
                req.id.clone(),
                "Internal error: failed to serialise result",
            )
        })?;

        Ok(JsonRpcResponse::success(req.id.clone(), result_value))
    }

    /// Runs the handoff tool. Tool failures become `isError` results.
    fn call_handoff(
        &self,
        req: &JsonRpcRequest,
        arguments: Value,
    ) -> Result<ToolCallResult, JsonRpcError> {
        let input: HandoffInput = serde_json::from_value(arguments).map_err(|e| {
            JsonRpcError::invalid_params(req.id.clone(), format!("Invalid arguments: {e}"))
        })?;

        Ok(match self.handoff.handle(&input) {
            Ok(outcome) => ToolCallResult::text(outcome.message),
            Err(e) => ToolCallResult::error(e.to_string()),
        })
    }

    /// Handles the ping request.
    fn handle_ping(req: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(req.id.clone(), json!({}))
    }

    /// Returns the list of available tools.
    #[must_use]
    pub fn get_tool_definitions() -> Vec<ToolDefinition> {
        vec![ToolDefinition {
            name: handoff::TOOL_NAME.to_string(),
            description: handoff::TOOL_DESCRIPTION.to_string(),
            input_schema: handoff::input_schema(),
        }]
    }
}
