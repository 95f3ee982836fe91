// crates/nagios-mcp-config/src/config.rs
// ============================================================================
// Module: Nagios MCP Configuration
// Description: Configuration loading and validation for the Nagios MCP server.
// Purpose: Provide strict, fail-closed environment parsing with hard limits.
// Dependencies: serde, thiserror, url
// ============================================================================

//! ## Overview
//! Configuration is assembled from environment variables through an injectable
//! lookup so callers (and tests) never depend on global process state.
//! Missing or invalid values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable holding the Nagios base URL.
pub const NAGIOS_URL_ENV: &str = "NAGIOS_URL";
/// Environment variable holding the Nagios basic-auth username.
pub const NAGIOS_USER_ENV: &str = "NAGIOS_USER";
/// Environment variable holding the Nagios basic-auth password.
pub const NAGIOS_PASS_ENV: &str = "NAGIOS_PASS";
/// Environment variable overriding the upstream request timeout.
pub const NAGIOS_TIMEOUT_MS_ENV: &str = "NAGIOS_TIMEOUT_MS";
/// Environment variable enabling CGI `formatoptions` on every request.
pub const NAGIOS_FORMAT_OPTIONS_ENV: &str = "NAGIOS_FORMAT_OPTIONS";
/// Default upstream request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;
/// Maximum upstream request timeout in milliseconds.
pub(crate) const MAX_TIMEOUT_MS: u64 = 300_000;
/// Default bind host for the SSE transport.
pub const DEFAULT_HOST: &str = "localhost";
/// Default bind port for the SSE transport.
pub const DEFAULT_PORT: u16 = 8000;
/// Default maximum inbound MCP message size in bytes.
pub(crate) const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
/// Path segment under which the Nagios CGIs are served.
const CGI_PATH: &str = "cgi-bin";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Nagios MCP process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NagiosConfig {
    /// Upstream Nagios Core CGI configuration.
    pub upstream: UpstreamConfig,
    /// MCP server configuration.
    pub server: ServerConfig,
}

impl NagiosConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration using the supplied variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|value| value.trim().to_string());
        let base_url = read(NAGIOS_URL_ENV)
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::Missing(NAGIOS_URL_ENV))?;
        let timeout_ms = match read(NAGIOS_TIMEOUT_MS_ENV).filter(|value| !value.is_empty()) {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                ConfigError::Invalid(format!("{NAGIOS_TIMEOUT_MS_ENV} must be an integer"))
            })?,
            None => DEFAULT_TIMEOUT_MS,
        };
        let config = Self {
            upstream: UpstreamConfig {
                base_url,
                username: lookup(NAGIOS_USER_ENV).filter(|value| !value.is_empty()),
                password: lookup(NAGIOS_PASS_ENV).filter(|value| !value.is_empty()),
                timeout_ms,
                format_options: read(NAGIOS_FORMAT_OPTIONS_ENV).filter(|value| !value.is_empty()),
                ..UpstreamConfig::default()
            },
            server: ServerConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the full configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when any section is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.upstream.validate()?;
        self.server.validate()
    }
}

/// Upstream Nagios Core CGI configuration.
///
/// # Invariants
/// - `base_url` is an absolute `http`/`https` URL without embedded credentials.
/// - `timeout_ms` applies to the full request lifecycle.
/// - `password` is never rendered by [`fmt::Debug`].
#[derive(Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    /// Base URL of the Nagios web interface (e.g. `http://nagios.local/nagios`).
    pub base_url: String,
    /// Basic-auth username.
    pub username: Option<String>,
    /// Basic-auth password.
    pub password: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Optional CGI `formatoptions` value appended to every request.
    pub format_options: Option<String>,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: None,
            password: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            format_options: None,
            user_agent: format!("nagios-mcp/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .field("format_options", &self.format_options)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl UpstreamConfig {
    /// Returns the absolute URL of a CGI script under `{base_url}/cgi-bin/`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the base URL cannot be parsed.
    pub fn cgi_url(&self, script: &str) -> Result<Url, ConfigError> {
        let base = self.base_url.trim_end_matches('/');
        Url::parse(&format!("{base}/{CGI_PATH}/{script}"))
            .map_err(|err| ConfigError::Invalid(format!("invalid {NAGIOS_URL_ENV}: {err}")))
    }

    /// Validates the upstream configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|err| ConfigError::Invalid(format!("invalid {NAGIOS_URL_ENV}: {err}")))?;
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ConfigError::Invalid(format!(
                    "{NAGIOS_URL_ENV} scheme must be http or https, got {other}"
                )));
            }
        }
        if url.host_str().is_none() {
            return Err(ConfigError::Invalid(format!("{NAGIOS_URL_ENV} requires a host")));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(ConfigError::Invalid(format!(
                "{NAGIOS_URL_ENV} must not embed credentials; use {NAGIOS_USER_ENV}/{NAGIOS_PASS_ENV}"
            )));
        }
        if self.password.is_some() && self.username.is_none() {
            return Err(ConfigError::Invalid(format!(
                "{NAGIOS_PASS_ENV} requires {NAGIOS_USER_ENV}"
            )));
        }
        if self.timeout_ms == 0 || self.timeout_ms > MAX_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "timeout_ms must be between 1 and {MAX_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }
}

/// MCP server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Transport type for MCP.
    pub transport: ServerTransport,
    /// Bind host for the SSE transport.
    pub host: String,
    /// Bind port for the SSE transport.
    pub port: u16,
    /// Maximum inbound message size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: ServerTransport::Stdio,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Validates server transport configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if self.transport == ServerTransport::Sse {
            if self.host.trim().is_empty() {
                return Err(ConfigError::Invalid("sse transport requires a host".to_string()));
            }
            if self.port == 0 {
                return Err(ConfigError::Invalid("sse transport requires a port".to_string()));
            }
        }
        Ok(())
    }
}

/// Supported MCP transport types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServerTransport {
    /// Use stdin/stdout transport.
    #[default]
    Stdio,
    /// Use HTTP + Server-Sent Events transport.
    Sse,
}

impl ServerTransport {
    /// Returns a stable label for the transport.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Sse => "sse",
        }
    }
}

impl fmt::Display for ServerTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Required environment variable is absent.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}
