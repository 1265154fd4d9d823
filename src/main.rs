//! chatgpt-handoff: MCP server that hands a prompt off to ChatGPT
//!
//! Runs over stdio by default, or as an HTTP endpoint with `--http`.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use chatgpt_handoff::config::{self, Config};
use chatgpt_handoff::handoff::SystemPlatform;
use chatgpt_handoff::mcp::{http, McpServer};

/// MCP server that hands a prompt off to ChatGPT.
///
/// The prompt is copied to the clipboard and, when short enough, opened in
/// ChatGPT through a browser deeplink.
#[derive(Parser, Debug)]
#[command(name = "chatgpt-handoff")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Serve over HTTP instead of stdio
    #[arg(long)]
    http: bool,

    /// HTTP port (default 8080, only used with --http)
    #[arg(long, value_name = "PORT")]
    port: Option<u16>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN, // Default to warn for unknown levels
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
///
/// Logs go to stderr; stdout carries the protocol in stdio mode.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs the selected transport to completion.
fn run(cfg: &Config) -> std::io::Result<()> {
    let platform = Arc::new(SystemPlatform::detect());
    info!(os = ?platform.family(), "Platform detected");

    let server = Arc::new(McpServer::new(platform, cfg.deeplink.max_length));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let result = if cfg.http.enabled {
        runtime.block_on(http::serve(server, &cfg.http))
    } else {
        info!("MCP server ready on stdio, waiting for client connection...");
        runtime.block_on(server.run())
    };

    // A tool call may still be blocked on a clipboard or browser command.
    runtime.shutdown_background();
    result
}

/// Entry point for the chatgpt-handoff server.
fn main() -> ExitCode {
    let args = Args::parse();

    let cfg = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg.with_overrides(args.http, args.port),
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        http = cfg.http.enabled,
        "Starting chatgpt-handoff server"
    );

    match run(&cfg) {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn parses_http_flags() {
        let args = Args::try_parse_from(["chatgpt-handoff", "--http", "--port", "9000"]).unwrap();
        assert!(args.http);
        assert_eq!(args.port, Some(9000));
        assert!(args.config.is_none());
    }

    #[test]
    fn rejects_invalid_port() {
        assert!(Args::try_parse_from(["chatgpt-handoff", "--port", "http"]).is_err());
    }

    #[test]
    fn log_level_precedence() {
        assert_eq!(get_log_level(0, true, "trace"), Level::ERROR);
        assert_eq!(get_log_level(2, false, "error"), Level::DEBUG);
        assert_eq!(get_log_level(0, false, "info"), Level::INFO);
        assert_eq!(get_log_level(0, false, "bogus"), Level::WARN);
    }
}
