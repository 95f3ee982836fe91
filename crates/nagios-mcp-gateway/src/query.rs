// crates/nagios-mcp-gateway/src/query.rs
// ============================================================================
// Module: CGI Queries
// Description: Endpoint identifiers and query-string builders for Nagios CGIs.
// Purpose: Give every tool its own immutable query value.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`CgiQuery`] is an ordered list of URL parameters that always starts with
//! the `query` discriminator. Repeated keys are permitted so list-valued
//! filters encode as repeated parameters.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Parameter naming the upstream report.
const QUERY_KEY: &str = "query";
/// Parameter widening list reports to full per-object detail.
const DETAILS_KEY: &str = "details";
/// Parameter selecting CGI output formatting flags.
const FORMAT_OPTIONS_KEY: &str = "formatoptions";
/// Discriminator suffix shared by every list report.
const LIST_SUFFIX: &str = "list";

// ============================================================================
// SECTION: Endpoints
// ============================================================================

/// Upstream CGI endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CgiEndpoint {
    /// Live status reports (`statusjson.cgi`).
    StatusJson,
    /// Configuration object reports (`objectjson.cgi`).
    ObjectJson,
}

impl CgiEndpoint {
    /// Returns the CGI script name for the endpoint.
    #[must_use]
    pub const fn script(self) -> &'static str {
        match self {
            Self::StatusJson => "statusjson.cgi",
            Self::ObjectJson => "objectjson.cgi",
        }
    }
}

impl fmt::Display for CgiEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.script())
    }
}

// ============================================================================
// SECTION: Query
// ============================================================================

/// Ordered CGI query parameters.
///
/// # Invariants
/// - The first pair is always `query=<discriminator>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CgiQuery {
    /// URL parameters in insertion order.
    pairs: Vec<(String, String)>,
}

impl CgiQuery {
    /// Creates a query for the named upstream report.
    #[must_use]
    pub fn new(discriminator: impl Into<String>) -> Self {
        Self {
            pairs: vec![(QUERY_KEY.to_string(), discriminator.into())],
        }
    }

    /// Appends a parameter.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    /// Appends a parameter when a value is present.
    #[must_use]
    pub fn with_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    /// Appends one parameter per value under the same key.
    #[must_use]
    pub fn with_all<I, V>(self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        values.into_iter().fold(self, |query, value| query.with(key, value))
    }

    /// Returns the report discriminator.
    #[must_use]
    pub fn discriminator(&self) -> &str {
        self.get(QUERY_KEY).unwrap_or_default()
    }

    /// Returns the first value recorded for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(name, _)| name == key).map(|(_, value)| value.as_str())
    }

    /// Returns every value recorded for `key`, in order.
    #[must_use]
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs.iter().filter(|(name, _)| name == key).map(|(_, value)| value.as_str()).collect()
    }

    /// Returns true when `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(name, _)| name == key)
    }

    /// Returns the distinct parameter names, in first-seen order.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::with_capacity(self.pairs.len());
        for (name, _) in &self.pairs {
            if !keys.contains(&name.as_str()) {
                keys.push(name.as_str());
            }
        }
        keys
    }

    /// Returns the raw parameter pairs.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

// ============================================================================
// SECTION: Preparation
// ============================================================================

/// Finalizes a query before it is sent upstream.
///
/// List reports (`*list`) without an explicit `details` parameter gain
/// `details=true`; `formatoptions` is appended when configured and absent.
#[must_use]
pub fn prepare_query(
    endpoint: CgiEndpoint,
    query: CgiQuery,
    format_options: Option<&str>,
) -> CgiQuery {
    let mut query = query;
    let detailed_endpoint = matches!(endpoint, CgiEndpoint::StatusJson | CgiEndpoint::ObjectJson);
    if detailed_endpoint
        && !query.contains_key(DETAILS_KEY)
        && query.discriminator().ends_with(LIST_SUFFIX)
    {
        query = query.with(DETAILS_KEY, "true");
    }
    if let Some(options) = format_options
        && !query.contains_key(FORMAT_OPTIONS_KEY)
    {
        query = query.with(FORMAT_OPTIONS_KEY, options);
    }
    query
}

// ============================================================================
// SECTION: Tests
// ============================================================================
