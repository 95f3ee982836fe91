// crates/nagios-mcp/src/lib.rs
// ============================================================================
// Module: Nagios MCP Library
// Description: MCP server exposing read-only Nagios Core monitoring tools.
// Purpose: Provide the tool catalog, tool routing, and JSON-RPC transports.
// Dependencies: axum, nagios-mcp-config, nagios-mcp-gateway, tokio
// ============================================================================

//! ## Overview
//! `nagios-mcp` turns the Nagios Core CGI JSON API into a catalog of MCP tools.
//! [`NagiosTools`] implements each tool over a [`nagios_mcp_gateway::CgiGateway`],
//! [`ToolRouter`] decodes tool-call arguments and dispatches them, and
//! [`McpServer`] speaks JSON-RPC over stdio or HTTP+SSE.
//!
//! Every tool is read-only. Upstream failures never fail a tool call; they are
//! recorded as diagnostics and surface as `null` (or empty collections) in the
//! tool result.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod catalog;
pub mod server;
pub mod tooling;
pub mod tools;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::McpAuditEvent;
pub use audit::McpAuditSink;
pub use audit::McpMethod;
pub use audit::McpNoopAuditSink;
pub use audit::McpOutcome;
pub use audit::McpStderrAuditSink;
pub use catalog::NagiosTools;
pub use catalog::NameFilter;
pub use catalog::ObjectType;
pub use catalog::ProblemScope;
pub use server::JsonRpcError;
pub use server::JsonRpcRequest;
pub use server::JsonRpcResponse;
pub use server::McpServer;
pub use server::McpServerError;
pub use tooling::ToolDefinition;
pub use tooling::ToolName;
pub use tooling::tool_definitions;
pub use tools::ToolError;
pub use tools::ToolRouter;
