// crates/nagios-mcp/src/tools.rs
// ============================================================================
// Module: MCP Tool Router
// Description: Argument decoding and dispatch for Nagios MCP tools.
// Purpose: Route `tools/call` requests onto the tool catalog.
// Dependencies: nagios-mcp-gateway, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`ToolRouter`] decodes the JSON arguments of a tool call into a typed
//! request, invokes the matching [`NagiosTools`] method, and serializes the
//! result. Upstream failures are not errors here: they surface as `null`.
//! Only unknown tools and malformed arguments fail the call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use nagios_mcp_gateway::CgiGateway;
use nagios_mcp_gateway::DiagnosticSink;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::catalog::DEFAULT_LIMIT;
use crate::catalog::NagiosTools;
use crate::catalog::NameFilter;
use crate::tooling::ToolDefinition;
use crate::tooling::ToolName;
use crate::tooling::tool_definitions;

// ============================================================================
// SECTION: Tool Arguments
// ============================================================================

/// Arguments for `get_host_status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostStatusRequest {
    /// Specific host name.
    #[serde(default)]
    pub host_name: Option<String>,
    /// Host states to include.
    #[serde(default)]
    pub host_status_filter: Option<NameFilter>,
    /// Host groups to include.
    #[serde(default)]
    pub host_group_filter: Option<NameFilter>,
}

/// Arguments for `get_service_status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceStatusRequest {
    /// Host name.
    #[serde(default)]
    pub host_name: Option<String>,
    /// Service description.
    #[serde(default)]
    pub service_description: Option<String>,
    /// Service states to include.
    #[serde(default)]
    pub service_status_filter: Option<NameFilter>,
    /// Host groups to include.
    #[serde(default)]
    pub host_group_filter: Option<NameFilter>,
    /// Service groups to include.
    #[serde(default)]
    pub service_group_filter: Option<NameFilter>,
}

/// Arguments for `get_hosts_in_group_status`.
#[derive(Debug, Clone, Deserialize)]
pub struct HostsInGroupRequest {
    /// Host group name.
    pub host_group_name: String,
    /// Host states to include.
    #[serde(default)]
    pub host_status_filter: Option<NameFilter>,
}

/// Arguments for `get_services_in_group_status`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServicesInGroupRequest {
    /// Service group name.
    pub service_group_name: String,
    /// Service states to include.
    #[serde(default)]
    pub service_status_filter: Option<NameFilter>,
}

/// Arguments for `get_services_on_host_in_group_status`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServicesOnHostInGroupRequest {
    /// Host group name.
    pub host_group_name: String,
    /// Host name.
    pub host_name: String,
    /// Service states to include.
    #[serde(default)]
    pub service_status_filter: Option<NameFilter>,
}

/// Arguments for `get_unhandled_problems`.
#[derive(Debug, Clone, Deserialize)]
pub struct UnhandledProblemsRequest {
    /// `all`, `host`, or `service`.
    #[serde(default = "default_problem_type")]
    pub problem_type: String,
}

/// Arguments for `get_object_list_config`.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectListRequest {
    /// Plural object type.
    pub object_type_plural: String,
}

/// Arguments for `get_single_object_config`.
#[derive(Debug, Clone, Deserialize)]
pub struct SingleObjectRequest {
    /// Singular object type.
    pub object_type_singular: String,
    /// Object name.
    pub object_name: String,
    /// Service description for service objects.
    #[serde(default)]
    pub service_description_for_service: Option<String>,
}

/// Arguments for `get_host_dependencies`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostDependenciesRequest {
    /// Dependent host name.
    #[serde(default)]
    pub host_name: Option<String>,
    /// Master host name.
    #[serde(default)]
    pub master_host: Option<String>,
    /// Dependent host name used when `host_name` is absent.
    #[serde(default)]
    pub dependent_host: Option<String>,
}

/// Arguments for `get_service_dependencies`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceDependenciesRequest {
    /// Dependent host name.
    #[serde(default)]
    pub host_name: Option<String>,
    /// Dependent service description.
    #[serde(default)]
    pub service_description: Option<String>,
    /// Master host name.
    #[serde(default)]
    pub master_host: Option<String>,
    /// Master service description.
    #[serde(default)]
    pub master_service_description: Option<String>,
}

/// Arguments for `get_contacts_for_object`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactsForObjectRequest {
    /// Singular object type.
    pub object_type: String,
    /// Object name.
    pub object_name: String,
    /// Service description for service objects.
    #[serde(default)]
    pub service_description: Option<String>,
}

/// Arguments for `get_comments`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentsRequest {
    /// Host name.
    #[serde(default)]
    pub host_name: Option<String>,
    /// Service description.
    #[serde(default)]
    pub service_description: Option<String>,
    /// Maximum number of comments.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// Arguments for `get_comment_by_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentByIdRequest {
    /// Comment id.
    pub comment_id: CommentId,
}

/// Comment id given as a string or an integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommentId {
    /// Textual id.
    Text(String),
    /// Numeric id.
    Number(u64),
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

/// Arguments for `get_downtimes`.
#[derive(Debug, Clone, Deserialize)]
pub struct DowntimesRequest {
    /// Host name.
    #[serde(default)]
    pub host_name: Option<String>,
    /// Service description.
    #[serde(default)]
    pub service_description: Option<String>,
    /// Only downtimes in effect.
    #[serde(default)]
    pub active_only: Option<bool>,
    /// Maximum number of downtimes.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// Default for [`UnhandledProblemsRequest::problem_type`].
fn default_problem_type() -> String {
    "all".to_string()
}

/// Default for listing limits.
const fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Dispatches MCP tool calls onto the Nagios tool catalog.
#[derive(Clone)]
pub struct ToolRouter {
    /// Tool implementations.
    tools: NagiosTools,
}

impl ToolRouter {
    /// Creates a router over an existing catalog.
    #[must_use]
    pub const fn new(tools: NagiosTools) -> Self {
        Self {
            tools,
        }
    }

    /// Creates a router over a gateway and diagnostic sink.
    #[must_use]
    pub fn from_gateway(
        gateway: Arc<dyn CgiGateway>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self::new(NagiosTools::new(gateway, diagnostics))
    }

    /// Returns the tool definitions for `tools/list`.
    #[must_use]
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        tool_definitions()
    }

    /// Invokes a tool by wire name.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] for unknown tools or undecodable arguments.
    pub fn handle_tool_call(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        let tool = ToolName::parse(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        self.call(tool, arguments)
    }

    /// Invokes a known tool.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when arguments cannot be decoded or the result
    /// cannot be serialized.
    pub fn call(&self, tool: ToolName, arguments: Value) -> Result<Value, ToolError> {
        let tools = &self.tools;
        match tool {
            ToolName::GetHostStatus => {
                let request: HostStatusRequest = decode(tool, arguments)?;
                encode(tools.get_host_status(
                    request.host_name.as_deref(),
                    request.host_status_filter.as_ref(),
                    request.host_group_filter.as_ref(),
                ))
            }
            ToolName::GetServiceStatus => {
                let request: ServiceStatusRequest = decode(tool, arguments)?;
                encode(tools.get_service_status(
                    request.host_name.as_deref(),
                    request.service_description.as_deref(),
                    request.service_status_filter.as_ref(),
                    request.host_group_filter.as_ref(),
                    request.service_group_filter.as_ref(),
                ))
            }
            ToolName::GetAlerts => encode(tools.get_alerts()),
            ToolName::GetProgramStatus => encode(tools.get_program_status()),
            ToolName::GetNagiosProcessInfo => encode(tools.get_nagios_process_info()),
            ToolName::GetHostsInGroupStatus => {
                let request: HostsInGroupRequest = decode(tool, arguments)?;
                encode(tools.get_hosts_in_group_status(
                    &request.host_group_name,
                    request.host_status_filter.as_ref(),
                ))
            }
            ToolName::GetServicesInGroupStatus => {
                let request: ServicesInGroupRequest = decode(tool, arguments)?;
                encode(tools.get_services_in_group_status(
                    &request.service_group_name,
                    request.service_status_filter.as_ref(),
                ))
            }
            ToolName::GetServicesOnHostInGroupStatus => {
                let request: ServicesOnHostInGroupRequest = decode(tool, arguments)?;
                encode(tools.get_services_on_host_in_group_status(
                    &request.host_group_name,
                    &request.host_name,
                    request.service_status_filter.as_ref(),
                ))
            }
            ToolName::GetOverallHealthSummary => encode(tools.get_overall_health_summary()),
            ToolName::GetUnhandledProblems => {
                let request: UnhandledProblemsRequest = decode(tool, arguments)?;
                encode(tools.get_unhandled_problems(&request.problem_type))
            }
            ToolName::GetObjectListConfig => {
                let request: ObjectListRequest = decode(tool, arguments)?;
                encode(tools.get_object_list_config(&request.object_type_plural))
            }
            ToolName::GetSingleObjectConfig => {
                let request: SingleObjectRequest = decode(tool, arguments)?;
                encode(tools.get_single_object_config(
                    &request.object_type_singular,
                    &request.object_name,
                    request.service_description_for_service.as_deref(),
                ))
            }
            ToolName::GetHostDependencies => {
                let request: HostDependenciesRequest = decode(tool, arguments)?;
                encode(tools.get_host_dependencies(
                    request.host_name.as_deref(),
                    request.master_host.as_deref(),
                    request.dependent_host.as_deref(),
                ))
            }
            ToolName::GetServiceDependencies => {
                let request: ServiceDependenciesRequest = decode(tool, arguments)?;
                encode(tools.get_service_dependencies(
                    request.host_name.as_deref(),
                    request.service_description.as_deref(),
                    request.master_host.as_deref(),
                    request.master_service_description.as_deref(),
                ))
            }
            ToolName::GetContactsForObject => {
                let request: ContactsForObjectRequest = decode(tool, arguments)?;
                encode(tools.get_contacts_for_object(
                    &request.object_type,
                    &request.object_name,
                    request.service_description.as_deref(),
                ))
            }
            ToolName::GetComments => {
                let request: CommentsRequest = decode(tool, arguments)?;
                encode(tools.get_comments(
                    request.host_name.as_deref(),
                    request.service_description.as_deref(),
                    request.limit,
                ))
            }
            ToolName::GetCommentById => {
                let request: CommentByIdRequest = decode(tool, arguments)?;
                encode(tools.get_comment_by_id(&request.comment_id.to_string()))
            }
            ToolName::GetDowntimes => {
                let request: DowntimesRequest = decode(tool, arguments)?;
                encode(tools.get_downtimes(
                    request.host_name.as_deref(),
                    request.service_description.as_deref(),
                    request.active_only.unwrap_or(false),
                    request.limit,
                ))
            }
        }
    }
}

/// Decodes tool arguments; a missing or `null` argument object means `{}`.
fn decode<T: DeserializeOwned>(tool: ToolName, arguments: Value) -> Result<T, ToolError> {
    let arguments = if arguments.is_null() { Value::Object(Map::new()) } else { arguments };
    serde_json::from_value(arguments)
        .map_err(|err| ToolError::InvalidParams(format!("{tool}: {err}")))
}

/// Serializes a tool result.
fn encode<T: Serialize>(result: T) -> Result<Value, ToolError> {
    serde_json::to_value(result).map_err(|err| ToolError::Serialization(err.to_string()))
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Tool routing errors.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool name is not part of the catalog.
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    /// Arguments did not match the tool's input shape.
    #[error("invalid params: {0}")]
    InvalidParams(String),
    /// Result could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
