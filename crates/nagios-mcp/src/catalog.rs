// crates/nagios-mcp/src/catalog.rs
// ============================================================================
// Module: Nagios Tool Catalog
// Description: Query builders for every Nagios status and configuration tool.
// Purpose: Map typed tool arguments onto CGI queries and project the results.
// Dependencies: nagios-mcp-gateway, serde, serde_json
// ============================================================================

//! ## Overview
//! [`NagiosTools`] turns tool arguments into one [`CgiQuery`] per upstream
//! call, sends it through a [`CgiGateway`], and returns the single report key
//! the tool is documented to produce. A failed call yields `None`; argument
//! errors are logged as validation diagnostics and never reach the gateway.
//!
//! Composite tools (alerts, health summary, unhandled problems, contacts)
//! issue their calls sequentially and tolerate partial failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use nagios_mcp_gateway::CgiEndpoint;
use nagios_mcp_gateway::CgiGateway;
use nagios_mcp_gateway::CgiQuery;
use nagios_mcp_gateway::DiagnosticEvent;
use nagios_mcp_gateway::DiagnosticSink;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::tooling::ToolName;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default `count` for comment and downtime listings.
pub const DEFAULT_LIMIT: u32 = 50;
/// Host states reported as alerts.
const HOST_PROBLEM_STATES: [&str; 2] = ["down", "unreachable"];
/// Service states reported as alerts.
const SERVICE_PROBLEM_STATES: [&str; 3] = ["warning", "critical", "unknown"];
/// Plural object type to list-report discriminator.
const OBJECT_LIST_QUERIES: [(&str, &str); 8] = [
    ("hosts", "hostlist"),
    ("services", "servicelist"),
    ("hostgroups", "hostgrouplist"),
    ("servicegroups", "servicegrouplist"),
    ("contacts", "contactlist"),
    ("contactgroups", "contactgrouplist"),
    ("timeperiods", "timeperiodlist"),
    ("commands", "commandlist"),
];
/// Upstream flag marking an acknowledged problem.
const ACKNOWLEDGED_FIELD: &str = "problem_has_been_acknowledged";
/// Upstream counter of active scheduled downtimes.
const DOWNTIME_DEPTH_FIELD: &str = "scheduled_downtime_depth";

// ============================================================================
// SECTION: Argument Types
// ============================================================================

/// Status or group filter given either as one name or a list of names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NameFilter {
    /// Single name.
    One(String),
    /// Several names.
    Many(Vec<String>),
}

impl NameFilter {
    /// Builds a list filter from any sequence of names.
    #[must_use]
    pub fn many<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Many(values.into_iter().map(Into::into).collect())
    }

    /// Returns the filter values; an empty single name yields nothing.
    #[must_use]
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::One(value) if value.is_empty() => Vec::new(),
            Self::One(value) => vec![value.as_str()],
            Self::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// Returns the values joined by single spaces, or `None` when empty.
    fn joined(&self) -> Option<String> {
        let values = self.values();
        if values.is_empty() { None } else { Some(values.join(" ")) }
    }
}

impl From<&str> for NameFilter {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

/// Configuration object types addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    /// Host definition.
    Host,
    /// Service definition (addressed by host plus description).
    Service,
    /// Host group definition.
    HostGroup,
    /// Service group definition.
    ServiceGroup,
    /// Contact definition.
    Contact,
    /// Contact group definition.
    ContactGroup,
    /// Time period definition.
    TimePeriod,
    /// Command definition.
    Command,
}

impl ObjectType {
    /// Parses a singular type name case-insensitively.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "host" => Some(Self::Host),
            "service" => Some(Self::Service),
            "hostgroup" => Some(Self::HostGroup),
            "servicegroup" => Some(Self::ServiceGroup),
            "contact" => Some(Self::Contact),
            "contactgroup" => Some(Self::ContactGroup),
            "timeperiod" => Some(Self::TimePeriod),
            "command" => Some(Self::Command),
            _ => None,
        }
    }

    /// Returns the report discriminator, which is also the payload key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Service => "service",
            Self::HostGroup => "hostgroup",
            Self::ServiceGroup => "servicegroup",
            Self::Contact => "contact",
            Self::ContactGroup => "contactgroup",
            Self::TimePeriod => "timeperiod",
            Self::Command => "command",
        }
    }

    /// Returns the query parameter that carries the object name.
    const fn name_field(self) -> &'static str {
        match self {
            Self::Host | Self::Service => "hostname",
            Self::HostGroup => "hostgroup",
            Self::ServiceGroup => "servicegroup",
            Self::Contact => "contactname",
            Self::ContactGroup => "contactgroup",
            Self::TimePeriod => "timeperiod",
            Self::Command => "command",
        }
    }
}

/// Scope selector for [`NagiosTools::get_unhandled_problems`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemScope {
    /// Hosts and services.
    All,
    /// Hosts only.
    Host,
    /// Services only.
    Service,
}

impl ProblemScope {
    /// Parses `all`, `host`, or `service`.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "all" => Some(Self::All),
            "host" => Some(Self::Host),
            "service" => Some(Self::Service),
            _ => None,
        }
    }

    /// Returns true when host problems are in scope.
    const fn includes_hosts(self) -> bool {
        matches!(self, Self::All | Self::Host)
    }

    /// Returns true when service problems are in scope.
    const fn includes_services(self) -> bool {
        matches!(self, Self::All | Self::Service)
    }
}

// ============================================================================
// SECTION: Result Types
// ============================================================================

/// Current host and service alerts. A failed half is `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertsReport {
    /// Hosts that are down or unreachable.
    pub hosts: Option<Value>,
    /// Services in warning, critical, or unknown state.
    pub services: Option<Value>,
}

/// Host and service state counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthSummary {
    /// Payload of the `hostcount` report.
    pub host_counts: Option<Value>,
    /// Payload of the `servicecount` report.
    pub service_counts: Option<Value>,
}

/// Problems not covered by downtime, as single-entry maps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnhandledProblems {
    /// Entries shaped `{host: status}`.
    pub hosts: Vec<Value>,
    /// Entries shaped `{host: {service: status}}`.
    pub services: Vec<Value>,
}

/// Contact and contact-group definitions attached to an object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    /// Contact definitions.
    pub contacts: Vec<Value>,
    /// Contact group definitions.
    pub contact_groups: Vec<Value>,
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Nagios status and configuration tools over a CGI gateway.
///
/// # Invariants
/// - Every call builds its own query; no state is shared between calls.
#[derive(Clone)]
pub struct NagiosTools {
    /// Upstream gateway.
    gateway: Arc<dyn CgiGateway>,
    /// Sink for argument validation failures.
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl NagiosTools {
    /// Creates a catalog over the given gateway.
    #[must_use]
    pub fn new(gateway: Arc<dyn CgiGateway>, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            gateway,
            diagnostics,
        }
    }

    // ------------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------------

    /// Returns status for one host (`host`) or all matching hosts (`hostlist`).
    #[must_use]
    pub fn get_host_status(
        &self,
        host_name: Option<&str>,
        host_status_filter: Option<&NameFilter>,
        host_group_filter: Option<&NameFilter>,
    ) -> Option<Value> {
        let host_name = non_empty(host_name);
        let discriminator = if host_name.is_some() { "host" } else { "hostlist" };
        let mut query = CgiQuery::new(discriminator).with_opt("hostname", host_name);
        query = query.with_opt("hoststatus", host_status_filter.and_then(NameFilter::joined));
        if let Some(groups) = host_group_filter {
            query = query.with_all("hostgroup", groups.values());
        }
        self.fetch(CgiEndpoint::StatusJson, query, discriminator)
    }

    /// Returns status for one service (`service`) or matching services (`servicelist`).
    ///
    /// A host name without a description filters the service list by host.
    #[must_use]
    pub fn get_service_status(
        &self,
        host_name: Option<&str>,
        service_description: Option<&str>,
        service_status_filter: Option<&NameFilter>,
        host_group_filter: Option<&NameFilter>,
        service_group_filter: Option<&NameFilter>,
    ) -> Option<Value> {
        let host_name = non_empty(host_name);
        let service_description = non_empty(service_description);
        let single = host_name.is_some() && service_description.is_some();
        let discriminator = if single { "service" } else { "servicelist" };
        let mut query = CgiQuery::new(discriminator).with_opt("hostname", host_name);
        if single {
            query = query.with_opt("servicedescription", service_description);
        }
        query = query.with_opt("servicestatus", service_status_filter.and_then(NameFilter::joined));
        if let Some(groups) = host_group_filter {
            query = query.with_all("hostgroup", groups.values());
        }
        if let Some(groups) = service_group_filter {
            query = query.with_all("servicegroup", groups.values());
        }
        self.fetch(CgiEndpoint::StatusJson, query, discriminator)
    }

    /// Returns problem hosts and problem services from two independent calls.
    #[must_use]
    pub fn get_alerts(&self) -> AlertsReport {
        AlertsReport {
            hosts: self.get_host_status(None, Some(&host_problem_filter()), None),
            services: self.get_service_status(
                None,
                None,
                Some(&service_problem_filter()),
                None,
                None,
            ),
        }
    }

    /// Returns the Nagios program status.
    #[must_use]
    pub fn get_program_status(&self) -> Option<Value> {
        self.fetch(CgiEndpoint::StatusJson, CgiQuery::new("programstatus"), "programstatus")
    }

    /// Returns the Nagios process information (same payload as program status).
    #[must_use]
    pub fn get_nagios_process_info(&self) -> Option<Value> {
        self.get_program_status()
    }

    /// Returns status for the hosts of one host group.
    #[must_use]
    pub fn get_hosts_in_group_status(
        &self,
        host_group_name: &str,
        host_status_filter: Option<&NameFilter>,
    ) -> Option<Value> {
        self.get_host_status(None, host_status_filter, Some(&NameFilter::from(host_group_name)))
    }

    /// Returns status for the services of one service group.
    #[must_use]
    pub fn get_services_in_group_status(
        &self,
        service_group_name: &str,
        service_status_filter: Option<&NameFilter>,
    ) -> Option<Value> {
        self.get_service_status(
            None,
            None,
            service_status_filter,
            None,
            Some(&NameFilter::from(service_group_name)),
        )
    }

    /// Returns status for the services of one host, scoped to a host group.
    #[must_use]
    pub fn get_services_on_host_in_group_status(
        &self,
        host_group_name: &str,
        host_name: &str,
        service_status_filter: Option<&NameFilter>,
    ) -> Option<Value> {
        self.get_service_status(
            Some(host_name),
            None,
            service_status_filter,
            Some(&NameFilter::from(host_group_name)),
            None,
        )
    }

    /// Returns host and service counts from two independent calls.
    #[must_use]
    pub fn get_overall_health_summary(&self) -> HealthSummary {
        HealthSummary {
            host_counts: self.fetch(CgiEndpoint::StatusJson, CgiQuery::new("hostcount"), "hostcount"),
            service_counts: self.fetch(
                CgiEndpoint::StatusJson,
                CgiQuery::new("servicecount"),
                "servicecount",
            ),
        }
    }

    /// Returns problems that are not in scheduled downtime.
    ///
    /// Hosts are kept when they are *not* acknowledged. Services are kept when
    /// they *are* acknowledged. The two checks intentionally differ and must
    /// not be unified without confirmation from the Nagios operators.
    /// An unknown `problem_type` yields two empty lists.
    #[must_use]
    pub fn get_unhandled_problems(&self, problem_type: &str) -> UnhandledProblems {
        let mut unhandled = UnhandledProblems::default();
        let Some(scope) = ProblemScope::parse(problem_type) else {
            return unhandled;
        };
        if scope.includes_hosts()
            && let Some(Value::Object(hosts)) =
                self.get_host_status(None, Some(&host_problem_filter()), None)
        {
            for (host, status) in hosts {
                let Some(entry) = status.as_object() else {
                    continue;
                };
                if !is_truthy(entry.get(ACKNOWLEDGED_FIELD)) && outside_downtime(entry) {
                    unhandled.hosts.push(single_entry(host, status));
                }
            }
        }
        if scope.includes_services()
            && let Some(Value::Object(hosts)) =
                self.get_service_status(None, None, Some(&service_problem_filter()), None, None)
        {
            for (host, services) in hosts {
                let Value::Object(services) = services else {
                    continue;
                };
                for (service, status) in services {
                    let Some(entry) = status.as_object() else {
                        continue;
                    };
                    if is_truthy(entry.get(ACKNOWLEDGED_FIELD)) && outside_downtime(entry) {
                        unhandled
                            .services
                            .push(single_entry(host.clone(), single_entry(service, status)));
                    }
                }
            }
        }
        unhandled
    }

    // ------------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------------

    /// Returns the configuration list for a plural object type (e.g. `hosts`).
    #[must_use]
    pub fn get_object_list_config(&self, object_type_plural: &str) -> Option<Value> {
        let plural = object_type_plural.to_lowercase();
        let Some((_, discriminator)) =
            OBJECT_LIST_QUERIES.iter().find(|(name, _)| *name == plural)
        else {
            self.reject(
                ToolName::GetObjectListConfig,
                format!("unsupported object_type_plural for listing: {object_type_plural}"),
            );
            return None;
        };
        self.fetch(CgiEndpoint::ObjectJson, CgiQuery::new(*discriminator), discriminator)
    }

    /// Returns the configuration of one named object.
    ///
    /// Services are addressed by host name (`object_name`) plus description.
    #[must_use]
    pub fn get_single_object_config(
        &self,
        object_type_singular: &str,
        object_name: &str,
        service_description_for_service: Option<&str>,
    ) -> Option<Value> {
        let Some(object_type) = ObjectType::parse(object_type_singular) else {
            self.reject(
                ToolName::GetSingleObjectConfig,
                format!("unsupported object type: {object_type_singular}"),
            );
            return None;
        };
        let mut query =
            CgiQuery::new(object_type.as_str()).with(object_type.name_field(), object_name);
        if object_type == ObjectType::Service {
            let Some(description) = non_empty(service_description_for_service) else {
                self.reject(
                    ToolName::GetSingleObjectConfig,
                    "service_description_for_service is required for service objects",
                );
                return None;
            };
            query = query.with("servicedescription", description);
        }
        self.fetch(CgiEndpoint::ObjectJson, query, object_type.as_str())
    }

    /// Returns host dependency definitions.
    ///
    /// Dependencies are object definitions, so the report is read from
    /// `objectjson.cgi` rather than `statusjson.cgi`. `dependent_host` is
    /// used only when `host_name` is absent.
    #[must_use]
    pub fn get_host_dependencies(
        &self,
        host_name: Option<&str>,
        master_host: Option<&str>,
        dependent_host: Option<&str>,
    ) -> Option<Value> {
        let dependent = non_empty(host_name).or_else(|| non_empty(dependent_host));
        let query = CgiQuery::new("hostdependencylist")
            .with_opt("dependenthostname", dependent)
            .with_opt("masterhostname", non_empty(master_host));
        self.gateway.request(CgiEndpoint::ObjectJson, query)
    }

    /// Returns service dependency definitions from `objectjson.cgi`.
    ///
    /// Every filter is optional; the unwrapped `data` payload is returned as is.
    #[must_use]
    pub fn get_service_dependencies(
        &self,
        host_name: Option<&str>,
        service_description: Option<&str>,
        master_host: Option<&str>,
        master_service_description: Option<&str>,
    ) -> Option<Value> {
        let query = CgiQuery::new("servicedependencylist")
            .with_opt("dependenthostname", non_empty(host_name))
            .with_opt("dependentservicedescription", non_empty(service_description))
            .with_opt("masterhostname", non_empty(master_host))
            .with_opt("masterservicedescription", non_empty(master_service_description));
        self.gateway.request(CgiEndpoint::ObjectJson, query)
    }

    /// Resolves the contacts and contact groups attached to an object.
    ///
    /// Issues one lookup for the object, then one per contact and contact
    /// group it names. Failed member lookups are skipped.
    #[must_use]
    pub fn get_contacts_for_object(
        &self,
        object_type: &str,
        object_name: &str,
        service_description: Option<&str>,
    ) -> Option<ContactInfo> {
        let config = self.get_single_object_config(object_type, object_name, service_description)?;
        if !is_truthy(Some(&config)) {
            return None;
        }
        let mut info = ContactInfo::default();
        for name in names(config.get("contacts")) {
            if let Some(contact) = self.lookup_member(ObjectType::Contact, name) {
                info.contacts.push(contact);
            }
        }
        for name in names(config.get("contact_groups")) {
            if let Some(group) = self.lookup_member(ObjectType::ContactGroup, name) {
                info.contact_groups.push(group);
            }
        }
        Some(info)
    }

    // ------------------------------------------------------------------------
    // Comments and downtime
    // ------------------------------------------------------------------------

    /// Returns comments, optionally scoped to a host or service.
    #[must_use]
    pub fn get_comments(
        &self,
        host_name: Option<&str>,
        service_description: Option<&str>,
        limit: u32,
    ) -> Option<Value> {
        let query = CgiQuery::new("commentlist")
            .with("count", limit)
            .with_opt("hostname", non_empty(host_name))
            .with_opt("servicedescription", non_empty(service_description));
        self.fetch(CgiEndpoint::StatusJson, query, "commentlist")
    }

    /// Returns one comment by id.
    #[must_use]
    pub fn get_comment_by_id(&self, comment_id: &str) -> Option<Value> {
        let query = CgiQuery::new("comment").with("commentid", comment_id);
        self.fetch(CgiEndpoint::StatusJson, query, "comment")
    }

    /// Returns scheduled downtimes; `active_only` restricts to those in effect.
    #[must_use]
    pub fn get_downtimes(
        &self,
        host_name: Option<&str>,
        service_description: Option<&str>,
        active_only: bool,
        limit: u32,
    ) -> Option<Value> {
        let mut query = CgiQuery::new("downtimelist")
            .with("count", limit)
            .with_opt("hostname", non_empty(host_name))
            .with_opt("servicedescription", non_empty(service_description));
        if active_only {
            query = query.with("ineffect", "yes");
        }
        self.fetch(CgiEndpoint::StatusJson, query, "downtimelist")
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// Issues one query and extracts `key` from the payload.
    fn fetch(&self, endpoint: CgiEndpoint, query: CgiQuery, key: &str) -> Option<Value> {
        match self.gateway.request(endpoint, query)? {
            Value::Object(mut data) => data.remove(key).filter(|value| !value.is_null()),
            _ => None,
        }
    }

    /// Looks up a contact or contact group named by another object.
    fn lookup_member(&self, object_type: ObjectType, name: &str) -> Option<Value> {
        let query = CgiQuery::new(object_type.as_str()).with(object_type.name_field(), name);
        self.fetch(CgiEndpoint::ObjectJson, query, object_type.as_str())
            .filter(|value| is_truthy(Some(value)))
    }

    /// Records a validation failure.
    fn reject(&self, tool: ToolName, message: impl Into<String>) {
        self.diagnostics.record(&DiagnosticEvent::validation(tool.as_str(), message));
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Filter selecting problem host states.
fn host_problem_filter() -> NameFilter {
    NameFilter::many(HOST_PROBLEM_STATES)
}

/// Filter selecting problem service states.
fn service_problem_filter() -> NameFilter {
    NameFilter::many(SERVICE_PROBLEM_STATES)
}

/// Treats empty strings as absent arguments.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

/// Returns true for values the upstream treats as set.
///
/// `null`, `false`, zero, and empty strings, arrays, or objects are unset.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n.abs() > f64::EPSILON),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(fields)) => !fields.is_empty(),
    }
}

/// Returns true when the downtime depth is absent or zero.
fn outside_downtime(entry: &Map<String, Value>) -> bool {
    match entry.get(DOWNTIME_DEPTH_FIELD) {
        None => true,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n.abs() < f64::EPSILON),
        Some(Value::Bool(flag)) => !flag,
        Some(_) => false,
    }
}

/// Wraps a value in a one-key object.
fn single_entry(key: String, value: Value) -> Value {
    let mut entry = Map::new();
    entry.insert(key, value);
    Value::Object(entry)
}

/// Returns the string members of a name list field.
fn names(value: Option<&Value>) -> impl Iterator<Item = &str> {
    value.and_then(Value::as_array).into_iter().flatten().filter_map(Value::as_str)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
