// crates/nagios-mcp-config/src/lib.rs
// ============================================================================
// Module: Nagios MCP Config Library
// Description: Canonical process configuration model and validation.
// Purpose: Single source of truth for upstream and server settings.
// Dependencies: serde, thiserror, url
// ============================================================================

//! ## Overview
//! `nagios-mcp-config` defines the process configuration for the Nagios MCP
//! server: the upstream Nagios Core CGI location and credentials, and the MCP
//! transport settings. Configuration is read once from the environment at
//! startup and is immutable for the process lifetime.
//!
//! Security posture: environment inputs are untrusted and validated fail
//! closed; credentials are redacted from debug output.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
