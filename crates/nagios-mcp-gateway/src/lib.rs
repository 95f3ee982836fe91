// crates/nagios-mcp-gateway/src/lib.rs
// ============================================================================
// Module: Nagios CGI Gateway
// Description: Authenticated request gateway for the Nagios Core CGI JSON API.
// Purpose: Translate CGI JSON envelopes into plain payloads or classified failures.
// Dependencies: nagios-mcp-config, reqwest, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The gateway owns the upstream HTTP session and issues one authenticated GET
//! per call against `statusjson.cgi` or `objectjson.cgi`. Responses are
//! unwrapped from the `{result, data}` envelope; every failure is classified,
//! logged through a [`DiagnosticSink`], and surfaced to callers as `None`.
//! There are no retries: each failure is terminal for that call.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod diagnostics;
pub mod query;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::CgiEnvelope;
pub use client::CgiGateway;
pub use client::CgiResult;
pub use client::GatewayError;
pub use client::RequestGateway;
pub use diagnostics::DiagnosticEvent;
pub use diagnostics::DiagnosticKind;
pub use diagnostics::DiagnosticSink;
pub use diagnostics::NoopDiagnosticSink;
pub use diagnostics::StderrDiagnosticSink;
pub use query::CgiEndpoint;
pub use query::CgiQuery;
pub use query::prepare_query;
