//! HTTP transport for MCP server.
//!
//! | Route          | Behaviour                                              |
//! |----------------|--------------------------------------------------------|
//! | `POST /mcp`    | one JSON-RPC message in, one out (`application/json`)  |
//! | `OPTIONS /mcp` | `200`, empty body (CORS preflight)                     |
//! | other `/mcp`   | `405 Method Not Allowed`                               |
//! | `/health`      | `200 OK` for any method                                |
//!
//! CORS on `/mcp` is wide open: any origin, `POST`/`OPTIONS`, and the
//! `Content-Type` and `Authorization` headers.
//!
//! `shutdown` is acknowledged but does not stop the server; only a
//! termination signal does.

use std::io;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::config::HttpConfig;
use crate::mcp::server::McpServer;
use crate::mcp::transport::shutdown_signal;

/// Path carrying JSON-RPC messages.
pub const MCP_PATH: &str = "/mcp";

/// Liveness probe path.
pub const HEALTH_PATH: &str = "/health";

/// Builds the HTTP router around a shared server.
pub fn router(server: Arc<McpServer>) -> Router {
    let mcp = Router::new()
        .route(MCP_PATH, post(handle_rpc).options(preflight))
        .layer(cors_layer());

    Router::new()
        .route(HEALTH_PATH, any(health))
        .merge(mcp)
        .with_state(server)
}

/// Binds `config`'s address and serves until a termination signal.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or serving fails.
pub async fn serve(server: Arc<McpServer>, config: &HttpConfig) -> io::Result<()> {
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| io::Error::new(e.kind(), format!("failed to bind {address}: {e}")))?;

    tracing::info!(address = %address, "HTTP transport listening");

    axum::serve(listener, router(server))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn handle_rpc(State(server): State<Arc<McpServer>>, body: Bytes) -> Response {
    // Tool calls block on external commands.
    let dispatch = match tokio::task::spawn_blocking(move || server.handle_bytes(&body)).await {
        Ok(dispatch) => dispatch,
        Err(e) => {
            tracing::error!(error = %e, "Request handler failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if dispatch.shutdown {
        tracing::info!("Shutdown acknowledged; HTTP server keeps running");
    }

    let Some(reply) = dispatch.reply else {
        return StatusCode::ACCEPTED.into_response();
    };

    match reply.to_json() {
        Ok(json) => ([(header::CONTENT_TYPE, "application/json")], json).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialise response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn health() -> &'static str {
    "OK"
}
