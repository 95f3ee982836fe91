// crates/nagios-mcp/src/tooling.rs
// ============================================================================
// Module: MCP Tool Definitions
// Description: Canonical tool names and input schemas for the Nagios tools.
// Purpose: Drive `tools/list` responses with stable names and JSON schemas.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines the MCP tool surface. The order of [`ToolName::all`]
//! is the order tools are listed to clients; append new tools at the end.
//! Tool inputs are untrusted and are decoded again by the router.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::catalog::DEFAULT_LIMIT;

// ============================================================================
// SECTION: Tool Names
// ============================================================================

/// Nagios MCP tool identifiers.
///
/// # Invariants
/// - Wire names are stable snake_case identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    /// Host status for one host or a filtered host list.
    GetHostStatus,
    /// Service status for one service or a filtered service list.
    GetServiceStatus,
    /// Problem hosts and services.
    GetAlerts,
    /// Nagios program status.
    GetProgramStatus,
    /// Host status scoped to a host group.
    GetHostsInGroupStatus,
    /// Service status scoped to a service group.
    GetServicesInGroupStatus,
    /// Service status for one host scoped to a host group.
    GetServicesOnHostInGroupStatus,
    /// Host and service counts.
    GetOverallHealthSummary,
    /// Problems not in scheduled downtime.
    GetUnhandledProblems,
    /// Configuration list for a plural object type.
    GetObjectListConfig,
    /// Configuration for one named object.
    GetSingleObjectConfig,
    /// Host dependency definitions.
    GetHostDependencies,
    /// Service dependency definitions.
    GetServiceDependencies,
    /// Contacts and contact groups attached to an object.
    GetContactsForObject,
    /// Comment listing.
    GetComments,
    /// One comment by id.
    GetCommentById,
    /// Scheduled downtime listing.
    GetDowntimes,
    /// Nagios process information.
    GetNagiosProcessInfo,
}

impl ToolName {
    /// Returns every tool in listing order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::GetHostStatus,
            Self::GetServiceStatus,
            Self::GetAlerts,
            Self::GetProgramStatus,
            Self::GetHostsInGroupStatus,
            Self::GetServicesInGroupStatus,
            Self::GetServicesOnHostInGroupStatus,
            Self::GetOverallHealthSummary,
            Self::GetUnhandledProblems,
            Self::GetObjectListConfig,
            Self::GetSingleObjectConfig,
            Self::GetHostDependencies,
            Self::GetServiceDependencies,
            Self::GetContactsForObject,
            Self::GetComments,
            Self::GetCommentById,
            Self::GetDowntimes,
            Self::GetNagiosProcessInfo,
        ]
    }

    /// Returns the wire name of the tool.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GetHostStatus => "get_host_status",
            Self::GetServiceStatus => "get_service_status",
            Self::GetAlerts => "get_alerts",
            Self::GetProgramStatus => "get_program_status",
            Self::GetHostsInGroupStatus => "get_hosts_in_group_status",
            Self::GetServicesInGroupStatus => "get_services_in_group_status",
            Self::GetServicesOnHostInGroupStatus => "get_services_on_host_in_group_status",
            Self::GetOverallHealthSummary => "get_overall_health_summary",
            Self::GetUnhandledProblems => "get_unhandled_problems",
            Self::GetObjectListConfig => "get_object_list_config",
            Self::GetSingleObjectConfig => "get_single_object_config",
            Self::GetHostDependencies => "get_host_dependencies",
            Self::GetServiceDependencies => "get_service_dependencies",
            Self::GetContactsForObject => "get_contacts_for_object",
            Self::GetComments => "get_comments",
            Self::GetCommentById => "get_comment_by_id",
            Self::GetDowntimes => "get_downtimes",
            Self::GetNagiosProcessInfo => "get_nagios_process_info",
        }
    }

    /// Parses a wire name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|tool| tool.as_str() == name)
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Tool Definitions
// ============================================================================

/// Tool definition shape used by MCP tool listings.
///
/// # Invariants
/// - `input_schema` is a JSON Schema object describing the tool arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// MCP tool name.
    pub name: ToolName,
    /// Tool description for clients.
    pub description: String,
    /// JSON schema for tool input.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Returns the MCP tool definitions for tool listing.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    ToolName::all()
        .iter()
        .map(|&name| ToolDefinition {
            name,
            description: description(name).to_string(),
            input_schema: input_schema(name),
        })
        .collect()
}

/// Returns the client-facing description of a tool.
const fn description(name: ToolName) -> &'static str {
    match name {
        ToolName::GetHostStatus => {
            "Retrieves status for all hosts or a specific host, optionally filtered by host \
             status and host group."
        }
        ToolName::GetServiceStatus => {
            "Retrieves status for services. With both host_name and service_description returns \
             a single service; otherwise a service list filtered by host, status, or group."
        }
        ToolName::GetAlerts => {
            "Retrieves current problem states: hosts that are down or unreachable and services \
             in warning, critical, or unknown state."
        }
        ToolName::GetProgramStatus => "Retrieves the Nagios Core program status.",
        ToolName::GetHostsInGroupStatus => {
            "Retrieves status for all hosts within a specific host group."
        }
        ToolName::GetServicesInGroupStatus => {
            "Retrieves status for all services within a specific service group."
        }
        ToolName::GetServicesOnHostInGroupStatus => {
            "Retrieves status for the services of one host within a specific host group."
        }
        ToolName::GetOverallHealthSummary => {
            "Retrieves host and service state counts for an overall health summary."
        }
        ToolName::GetUnhandledProblems => {
            "Retrieves problems that are not in scheduled downtime for hosts, services, or both."
        }
        ToolName::GetObjectListConfig => {
            "Retrieves the configuration list for an object type such as hosts, services, \
             hostgroups, servicegroups, contacts, contactgroups, timeperiods, or commands."
        }
        ToolName::GetSingleObjectConfig => {
            "Retrieves configuration for a single object. For services, object_name is the host \
             name and service_description_for_service is required."
        }
        ToolName::GetHostDependencies => "Retrieves host dependency definitions.",
        ToolName::GetServiceDependencies => "Retrieves service dependency definitions.",
        ToolName::GetContactsForObject => {
            "Retrieves the contacts and contact groups notified for an object."
        }
        ToolName::GetComments => "Retrieves comments, optionally for a host or service.",
        ToolName::GetCommentById => "Retrieves a single comment by its id.",
        ToolName::GetDowntimes => {
            "Retrieves scheduled downtimes, optionally for a host or service or only those in \
             effect."
        }
        ToolName::GetNagiosProcessInfo => {
            "Retrieves Nagios process information. Alias for get_program_status."
        }
    }
}

/// Returns the JSON schema for a tool's arguments.
fn input_schema(name: ToolName) -> Value {
    match name {
        ToolName::GetHostStatus => object_schema(
            &[
                ("host_name", schema_for_string("Specific host; omit for all hosts.")),
                (
                    "host_status_filter",
                    schema_for_status_filter(
                        "Host states to include, e.g. [\"down\", \"unreachable\"].",
                    ),
                ),
                ("host_group_filter", schema_for_name_filter("Host groups to include.")),
            ],
            &[],
        ),
        ToolName::GetServiceStatus => object_schema(
            &[
                ("host_name", schema_for_string("Host to filter services by.")),
                ("service_description", schema_for_string("Specific service description.")),
                (
                    "service_status_filter",
                    schema_for_status_filter(
                        "Service states to include, e.g. [\"warning\", \"critical\"].",
                    ),
                ),
                ("host_group_filter", schema_for_name_filter("Host groups to include.")),
                ("service_group_filter", schema_for_name_filter("Service groups to include.")),
            ],
            &[],
        ),
        ToolName::GetHostsInGroupStatus => object_schema(
            &[
                ("host_group_name", schema_for_string("Host group name.")),
                ("host_status_filter", schema_for_status_filter("Host states to include.")),
            ],
            &["host_group_name"],
        ),
        ToolName::GetServicesInGroupStatus => object_schema(
            &[
                ("service_group_name", schema_for_string("Service group name.")),
                ("service_status_filter", schema_for_status_filter("Service states to include.")),
            ],
            &["service_group_name"],
        ),
        ToolName::GetServicesOnHostInGroupStatus => object_schema(
            &[
                ("host_group_name", schema_for_string("Host group name.")),
                ("host_name", schema_for_string("Host name.")),
                ("service_status_filter", schema_for_status_filter("Service states to include.")),
            ],
            &["host_group_name", "host_name"],
        ),
        ToolName::GetUnhandledProblems => object_schema(
            &[(
                "problem_type",
                json!({
                    "type": "string",
                    "enum": ["all", "host", "service"],
                    "default": "all",
                    "description": "Which problems to include."
                }),
            )],
            &[],
        ),
        ToolName::GetObjectListConfig => object_schema(
            &[(
                "object_type_plural",
                schema_for_string(
                    "Plural object type: hosts, services, hostgroups, servicegroups, contacts, \
                     contactgroups, timeperiods, or commands.",
                ),
            )],
            &["object_type_plural"],
        ),
        ToolName::GetSingleObjectConfig => object_schema(
            &[
                (
                    "object_type_singular",
                    schema_for_string(
                        "Singular object type: host, service, hostgroup, servicegroup, contact, \
                         contactgroup, timeperiod, or command.",
                    ),
                ),
                ("object_name", schema_for_string("Object name; the host name for services.")),
                (
                    "service_description_for_service",
                    schema_for_string("Service description; required for service objects."),
                ),
            ],
            &["object_type_singular", "object_name"],
        ),
        ToolName::GetHostDependencies => object_schema(
            &[
                ("host_name", schema_for_string("Dependent host name.")),
                ("master_host", schema_for_string("Master host name.")),
                (
                    "dependent_host",
                    schema_for_string("Dependent host name; ignored when host_name is set."),
                ),
            ],
            &[],
        ),
        ToolName::GetServiceDependencies => object_schema(
            &[
                ("host_name", schema_for_string("Dependent host name.")),
                ("service_description", schema_for_string("Dependent service description.")),
                ("master_host", schema_for_string("Master host name.")),
                ("master_service_description", schema_for_string("Master service description.")),
            ],
            &[],
        ),
        ToolName::GetContactsForObject => object_schema(
            &[
                ("object_type", schema_for_string("Singular object type, e.g. host or service.")),
                ("object_name", schema_for_string("Object name; the host name for services.")),
                ("service_description", schema_for_string("Service description for services.")),
            ],
            &["object_type", "object_name"],
        ),
        ToolName::GetComments => object_schema(
            &[
                ("host_name", schema_for_string("Host name.")),
                ("service_description", schema_for_string("Service description.")),
                ("limit", schema_for_limit("Maximum number of comments to return.")),
            ],
            &[],
        ),
        ToolName::GetCommentById => object_schema(
            &[(
                "comment_id",
                json!({
                    "type": ["string", "integer"],
                    "description": "Comment id."
                }),
            )],
            &["comment_id"],
        ),
        ToolName::GetDowntimes => object_schema(
            &[
                ("host_name", schema_for_string("Host name.")),
                ("service_description", schema_for_string("Service description.")),
                (
                    "active_only",
                    json!({
                        "type": "boolean",
                        "description": "Only downtimes currently in effect."
                    }),
                ),
                ("limit", schema_for_limit("Maximum number of downtimes to return.")),
            ],
            &[],
        ),
        ToolName::GetAlerts
        | ToolName::GetProgramStatus
        | ToolName::GetOverallHealthSummary
        | ToolName::GetNagiosProcessInfo => object_schema(&[], &[]),
    }
}

/// Builds an object schema from named property schemas.
fn object_schema(properties: &[(&str, Value)], required: &[&str]) -> Value {
    let properties: serde_json::Map<String, Value> = properties
        .iter()
        .map(|(name, schema)| ((*name).to_string(), schema.clone()))
        .collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Returns a JSON schema for strings.
fn schema_for_string(description: &str) -> Value {
    json!({
        "type": "string",
        "description": description
    })
}

/// Returns a JSON schema for a name or list of names.
fn schema_for_name_filter(description: &str) -> Value {
    json!({
        "anyOf": [
            { "type": "string" },
            { "type": "array", "items": { "type": "string" } }
        ],
        "description": description
    })
}

/// Returns a JSON schema for a state filter.
fn schema_for_status_filter(description: &str) -> Value {
    schema_for_name_filter(&format!(
        "{description} A single string is sent as one state; list entries are combined."
    ))
}

/// Returns a JSON schema for result limits.
fn schema_for_limit(description: &str) -> Value {
    json!({
        "type": "integer",
        "minimum": 0,
        "default": DEFAULT_LIMIT,
        "description": description
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
