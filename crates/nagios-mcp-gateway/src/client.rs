// crates/nagios-mcp-gateway/src/client.rs
// ============================================================================
// Module: CGI Request Gateway
// Description: Authenticated GET client for the Nagios CGI JSON API.
// Purpose: Unwrap CGI envelopes and classify every failure.
// Dependencies: nagios-mcp-config, reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! [`RequestGateway`] issues one bounded GET per call with basic auth and the
//! configured timeout. Classification order is fixed: HTTP failure
//! (transport), body not JSON (decode), `type_code != 0` (upstream semantic),
//! otherwise the envelope's `data` object is returned.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use nagios_mcp_config::UpstreamConfig;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::diagnostics::DiagnosticEvent;
use crate::diagnostics::DiagnosticKind;
use crate::diagnostics::DiagnosticSink;
use crate::query::CgiEndpoint;
use crate::query::CgiQuery;
use crate::query::prepare_query;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Message used when a failing envelope carries no message.
const UNKNOWN_CGI_ERROR: &str = "Unknown CGI Error";

// ============================================================================
// SECTION: Gateway Trait
// ============================================================================

/// Read-only access to the Nagios CGI JSON API.
///
/// Implementations return the unwrapped `data` payload, or `None` after
/// logging when the call fails for any reason.
pub trait CgiGateway: Send + Sync {
    /// Issues a query against `endpoint`.
    fn request(&self, endpoint: CgiEndpoint, query: CgiQuery) -> Option<Value>;
}

// ============================================================================
// SECTION: Envelope
// ============================================================================

/// CGI JSON response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct CgiEnvelope {
    /// Result status block.
    #[serde(default)]
    pub result: Option<CgiResult>,
    /// Report payload keyed by report name.
    #[serde(default)]
    pub data: Option<Value>,
}

/// CGI result status block.
#[derive(Debug, Clone, Deserialize)]
pub struct CgiResult {
    /// Zero on success; any other value is a semantic failure.
    #[serde(default)]
    pub type_code: Option<i64>,
    /// Human-readable status message.
    #[serde(default)]
    pub message: Option<String>,
}

impl CgiEnvelope {
    /// Decodes a response body and unwraps its `data` payload.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Decode`] for malformed bodies and
    /// [`GatewayError::Upstream`] when `type_code` is missing or non-zero.
    pub fn unwrap_body(body: &str) -> Result<Value, GatewayError> {
        let raw: Value =
            serde_json::from_str(body).map_err(|err| GatewayError::Decode(err.to_string()))?;
        let envelope: Self = serde_json::from_value(raw.clone())
            .map_err(|err| GatewayError::Decode(format!("unexpected envelope shape: {err}")))?;
        let result = envelope.result.unwrap_or(CgiResult {
            type_code: None,
            message: None,
        });
        if result.type_code == Some(0) {
            return Ok(envelope.data.unwrap_or_else(|| Value::Object(Map::new())));
        }
        Err(GatewayError::Upstream {
            message: result.message.unwrap_or_else(|| UNKNOWN_CGI_ERROR.to_string()),
            envelope: raw,
        })
    }
}

// ============================================================================
// SECTION: Request Gateway
// ============================================================================

/// Blocking CGI client bound to one upstream configuration.
///
/// # Invariants
/// - Configuration is immutable after construction.
/// - The client is safe to share across concurrent calls.
pub struct RequestGateway {
    /// Upstream configuration, including credentials and timeout.
    config: UpstreamConfig,
    /// HTTP client used for outbound requests.
    client: Client,
    /// Sink for classified failures.
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl RequestGateway {
    /// Creates a gateway for the given upstream.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the HTTP client cannot be created or the
    /// configuration is invalid.
    pub fn new(
        config: UpstreamConfig,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, GatewayError> {
        config
            .cgi_url(CgiEndpoint::StatusJson.script())
            .map_err(|err| GatewayError::Init(err.to_string()))?;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| GatewayError::Init(format!("http client build failed: {err}")))?;
        Ok(Self {
            config,
            client,
            diagnostics,
        })
    }

    /// Issues a query and returns the unwrapped payload or a classified error.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] for transport, decode, or upstream failures.
    pub fn try_request(&self, endpoint: CgiEndpoint, query: CgiQuery) -> Result<Value, GatewayError> {
        let query = prepare_query(endpoint, query, self.config.format_options.as_deref());
        let mut url = self
            .config
            .cgi_url(endpoint.script())
            .map_err(|err| GatewayError::Init(err.to_string()))?;
        url.query_pairs_mut()
            .extend_pairs(query.pairs().iter().map(|(key, value)| (key.as_str(), value.as_str())));

        let mut request = self.client.get(url.as_str());
        if let Some(username) = &self.config.username {
            request = request.basic_auth(username, Some(self.config.password.as_deref().unwrap_or("")));
        }
        let response = request.send().map_err(|err| GatewayError::Transport {
            status: err.status().map(|status| status.as_u16()),
            url: url.to_string(),
            message: format!("request failed: {err}"),
            body: None,
        })?;

        let status = response.status();
        let final_url = response.url().to_string();
        let body = response.text().map_err(|err| GatewayError::Transport {
            status: Some(status.as_u16()),
            url: final_url.clone(),
            message: format!("failed to read response: {err}"),
            body: None,
        })?;
        if !status.is_success() {
            return Err(GatewayError::Transport {
                status: Some(status.as_u16()),
                url: final_url,
                message: format!("http status {status}"),
                body: Some(body),
            });
        }
        CgiEnvelope::unwrap_body(&body)
    }
}

impl CgiGateway for RequestGateway {
    fn request(&self, endpoint: CgiEndpoint, query: CgiQuery) -> Option<Value> {
        let logged = prepare_query(endpoint, query.clone(), self.config.format_options.as_deref());
        match self.try_request(endpoint, query) {
            Ok(data) => Some(data),
            Err(err) => {
                self.diagnostics.record(&err.to_diagnostic().with_request(endpoint, &logged));
                None
            }
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Gateway failures.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Gateway could not be constructed.
    #[error("gateway init error: {0}")]
    Init(String),
    /// HTTP or connection-level failure.
    #[error("http error for {url}: {message}")]
    Transport {
        /// HTTP status code when a response was received.
        status: Option<u16>,
        /// Request URL.
        url: String,
        /// Failure description.
        message: String,
        /// Response body when available.
        body: Option<String>,
    },
    /// Upstream envelope reported a semantic failure.
    #[error("cgi error: {message}")]
    Upstream {
        /// Upstream status message.
        message: String,
        /// Full response envelope.
        envelope: Value,
    },
    /// Response body was not a valid envelope.
    #[error("failed to decode json: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Returns the diagnostic classification for the error.
    #[must_use]
    pub const fn kind(&self) -> DiagnosticKind {
        match self {
            Self::Init(_) | Self::Transport { .. } => DiagnosticKind::Transport,
            Self::Upstream { .. } => DiagnosticKind::UpstreamSemantic,
            Self::Decode(_) => DiagnosticKind::Decode,
        }
    }

    /// Converts the error into a diagnostic event.
    #[must_use]
    pub fn to_diagnostic(&self) -> DiagnosticEvent {
        let mut event = DiagnosticEvent::new(self.kind(), self.to_string());
        match self {
            Self::Transport {
                status,
                url,
                body,
                ..
            } => {
                event.status = *status;
                event.url = Some(url.clone());
                event.detail = body.clone().map(Value::String);
            }
            Self::Upstream {
                envelope, ..
            } => {
                event.detail = Some(envelope.clone());
            }
            Self::Init(_) | Self::Decode(_) => {}
        }
        event
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
