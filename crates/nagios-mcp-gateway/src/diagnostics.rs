// crates/nagios-mcp-gateway/src/diagnostics.rs
// ============================================================================
// Module: Gateway Diagnostics
// Description: Structured diagnostic events for failed upstream calls.
// Purpose: Emit classified failure logs without hard logging dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every failure that degrades a tool result to `null` produces one
//! [`DiagnosticEvent`] tagged with its [`DiagnosticKind`]. Sinks decide where
//! the JSON line goes; the default writes to stderr so stdio transports keep
//! stdout reserved for protocol traffic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use serde_json::Value;

use crate::query::CgiEndpoint;
use crate::query::CgiQuery;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Failure classification carried on every diagnostic event.
///
/// # Invariants
/// - Variants are stable for log labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// HTTP or connection-level failure.
    Transport,
    /// Upstream envelope reported `type_code != 0`.
    UpstreamSemantic,
    /// Response body was not valid JSON.
    Decode,
    /// Tool arguments were rejected before any upstream call.
    Validation,
}

impl DiagnosticKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::UpstreamSemantic => "upstream_semantic",
            Self::Decode => "decode",
            Self::Validation => "validation",
        }
    }
}

/// Diagnostic event payload.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Failure classification.
    pub kind: DiagnosticKind,
    /// Upstream endpoint when a request was attempted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<CgiEndpoint>,
    /// Query parameters when a request was attempted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<CgiQuery>,
    /// Tool name for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<&'static str>,
    /// HTTP status code when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Request URL when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Human-readable failure message.
    pub message: String,
    /// Response body or full upstream envelope for debugging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl DiagnosticEvent {
    /// Creates a new diagnostic event with a consistent timestamp.
    #[must_use]
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "nagios_call_failed",
            timestamp_ms,
            kind,
            endpoint: None,
            query: None,
            tool: None,
            status: None,
            url: None,
            message: message.into(),
            detail: None,
        }
    }

    /// Creates a validation failure event for a tool.
    #[must_use]
    pub fn validation(tool: &'static str, message: impl Into<String>) -> Self {
        Self {
            tool: Some(tool),
            ..Self::new(DiagnosticKind::Validation, message)
        }
    }

    /// Attaches the request that failed.
    #[must_use]
    pub fn with_request(mut self, endpoint: CgiEndpoint, query: &CgiQuery) -> Self {
        self.endpoint = Some(endpoint);
        self.query = Some(query.clone());
        self
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Sink for gateway and tool diagnostics.
pub trait DiagnosticSink: Send + Sync {
    /// Record a diagnostic event.
    fn record(&self, event: &DiagnosticEvent);
}

/// Diagnostic sink that logs JSON lines to stderr.
pub struct StderrDiagnosticSink;

impl DiagnosticSink for StderrDiagnosticSink {
    fn record(&self, event: &DiagnosticEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// No-op diagnostic sink.
pub struct NoopDiagnosticSink;

impl DiagnosticSink for NoopDiagnosticSink {
    fn record(&self, _event: &DiagnosticEvent) {}
}
