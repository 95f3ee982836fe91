// crates/nagios-mcp-cli/src/main.rs
// ============================================================================
// Module: Nagios MCP CLI Entry Point
// Description: Command-line launcher for the Nagios MCP server.
// Purpose: Load configuration, apply flag overrides, and run a transport.
// Dependencies: clap, dotenv, nagios-mcp, nagios-mcp-config, thiserror, tokio
// ============================================================================

//! ## Overview
//! `nagios-mcp` reads the Nagios connection settings from the environment
//! (optionally seeded from a `.env` file), applies `--transport`, `--host`,
//! and `--port`, and serves MCP until input ends or the user interrupts.
//! Only diagnostics go to stderr; stdout belongs to the stdio transport.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use clap::ValueEnum;
use nagios_mcp::McpServer;
use nagios_mcp::McpServerError;
use nagios_mcp_config::NagiosConfig;
use nagios_mcp_config::ServerTransport;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Time allowed for in-flight work after the server stops.
///
/// The stdio reader cannot be cancelled, so runtime shutdown is bounded.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Nagios MCP server command line.
#[derive(Parser, Debug)]
#[command(name = "nagios-mcp", version, about = "MCP server for the Nagios Core CGI JSON API")]
struct Cli {
    /// Transport protocol to serve MCP over.
    #[arg(long, value_enum, default_value_t = TransportArg::Stdio)]
    transport: TransportArg,
    /// Bind host for the SSE transport (default: localhost).
    #[arg(long, value_name = "HOST")]
    host: Option<String>,
    /// Bind port for the SSE transport (default: 8000).
    #[arg(long, value_name = "PORT")]
    port: Option<u16>,
}

/// Transport selection flag.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum TransportArg {
    /// JSON-RPC over stdin/stdout.
    Stdio,
    /// JSON-RPC over HTTP with Server-Sent Events.
    Sse,
}

impl From<TransportArg> for ServerTransport {
    fn from(value: TransportArg) -> Self {
        match value {
            TransportArg::Stdio => Self::Stdio,
            TransportArg::Sse => Self::Sse,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => return emit_error(&format!("failed to start async runtime: {err}")),
    };
    let outcome = runtime.block_on(run(Cli::parse()));
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    match outcome {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Loads configuration and serves until completion or interrupt.
async fn run(cli: Cli) -> CliResult<ExitCode> {
    let _ = dotenv::dotenv();
    let mut config = NagiosConfig::from_env()
        .map_err(|err| CliError::new(format!("failed to load configuration: {err}")))?;
    apply_overrides(&mut config, &cli)?;

    let _ = write_stderr_line(&startup_message(&config));
    let server = tokio::task::spawn_blocking(move || McpServer::from_config(config))
        .await
        .map_err(|err| CliError::new(format!("server init join failed: {err}")))?
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?;

    tokio::select! {
        result = server.serve() => {
            result.map_err(|err: McpServerError| CliError::new(format!("server failed: {err}")))?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal.map_err(|err| CliError::new(format!("failed to listen for interrupt: {err}")))?;
            let _ = write_stderr_line("server stopped by user");
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Applies command-line overrides and re-validates the configuration.
fn apply_overrides(config: &mut NagiosConfig, cli: &Cli) -> CliResult<()> {
    config.server.transport = cli.transport.into();
    if let Some(host) = &cli.host {
        config.server.host.clone_from(host);
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate().map_err(|err| CliError::new(format!("invalid configuration: {err}")))
}

/// Describes the transport the server is about to start.
fn startup_message(config: &NagiosConfig) -> String {
    match config.server.transport {
        ServerTransport::Stdio => "starting nagios mcp server with stdio transport".to_string(),
        ServerTransport::Sse => format!(
            "starting nagios mcp server with sse transport on {}:{}",
            config.server.host, config.server.port
        ),
    }
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
