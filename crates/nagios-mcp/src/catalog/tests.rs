// crates/nagios-mcp/src/catalog/tests.rs
// ============================================================================
// Module: Tool Catalog Unit Tests
// Description: Query-shape and projection tests for the Nagios tool catalog.
// Purpose: Pin every tool to its upstream report, parameters, and payload key.
// Dependencies: nagios-mcp, nagios-mcp-gateway
// ============================================================================

//! ## Overview
//! Drives [`NagiosTools`] against a recording gateway so each test can assert
//! the exact CGI query a tool produced and how it projected the reply.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use nagios_mcp_gateway::CgiEndpoint;
use nagios_mcp_gateway::DiagnosticKind;
use serde_json::Value;
use serde_json::json;

use super::*;
use crate::tests::RecordingGateway;
use crate::tests::catalog;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const FAILED: &str = r#"{"result":{"type_code":1,"message":"bad query"}}"#;

fn failing(discriminators: &[&str]) -> RecordingGateway {
    let failure: Value = serde_json::from_str(FAILED).unwrap();
    discriminators
        .iter()
        .fold(RecordingGateway::default(), |gateway, name| gateway.envelope(name, failure.clone()))
}

// ============================================================================
// SECTION: Host and Service Status
// ============================================================================

#[test]
fn host_status_without_arguments_lists_hosts() {
    let (tools, gateway, _) = catalog(
        RecordingGateway::default()
            .envelope("hostlist", json!({"result":{"type_code":0},"data":{"hostlist":{"h1":{"status":"up"}}}})),
    );

    let result = tools.get_host_status(None, None, None);

    assert_eq!(result, Some(json!({"h1": {"status": "up"}})));
    let (endpoint, query) = gateway.only_query();
    assert_eq!(endpoint, CgiEndpoint::StatusJson);
    assert_eq!(query.keys(), vec!["query"]);
    assert_eq!(query.discriminator(), "hostlist");
}

#[test]
fn host_status_for_one_host_projects_host_key() {
    let (tools, gateway, _) = catalog(RecordingGateway::default().data(
        "host",
        json!({"host": {"name": "h1", "status": 2}, "hostlist": {"other": {}}}),
    ));

    let result = tools.get_host_status(Some("h1"), None, None);

    assert_eq!(result, Some(json!({"name": "h1", "status": 2})));
    let (_, query) = gateway.only_query();
    assert_eq!(query.discriminator(), "host");
    assert_eq!(query.get("hostname"), Some("h1"));
}

#[test]
fn host_status_filters_join_states_and_repeat_groups() {
    let (tools, gateway, _) = catalog(RecordingGateway::default());
    let states = NameFilter::many(["down", "unreachable"]);
    let groups = NameFilter::many(["web", "db"]);

    let _ = tools.get_host_status(None, Some(&states), Some(&groups));

    let (_, query) = gateway.only_query();
    assert_eq!(query.get("hoststatus"), Some("down unreachable"));
    assert_eq!(query.get_all("hostgroup"), vec!["web", "db"]);
}

#[test]
fn single_string_status_filter_is_one_state() {
    let (tools, gateway, _) = catalog(RecordingGateway::default());

    let _ = tools.get_host_status(None, Some(&NameFilter::from("down")), None);

    assert_eq!(gateway.only_query().1.get("hoststatus"), Some("down"));
}

#[test]
fn empty_host_name_is_treated_as_absent() {
    let (tools, gateway, _) = catalog(RecordingGateway::default());

    let _ = tools.get_host_status(Some(""), None, None);

    let (_, query) = gateway.only_query();
    assert_eq!(query.discriminator(), "hostlist");
    assert!(!query.contains_key("hostname"));
}

#[test]
fn service_status_with_host_and_description_queries_one_service() {
    let (tools, gateway, _) =
        catalog(RecordingGateway::default().data("service", json!({"service": {"status": 16}})));

    let result = tools.get_service_status(Some("web01"), Some("HTTP"), None, None, None);

    assert_eq!(result, Some(json!({"status": 16})));
    let (_, query) = gateway.only_query();
    assert_eq!(query.discriminator(), "service");
    assert_eq!(query.get("hostname"), Some("web01"));
    assert_eq!(query.get("servicedescription"), Some("HTTP"));
}

#[test]
fn service_status_with_host_only_filters_service_list() {
    let (tools, gateway, _) = catalog(RecordingGateway::default());

    let _ = tools.get_service_status(Some("web01"), None, None, None, None);

    let (_, query) = gateway.only_query();
    assert_eq!(query.discriminator(), "servicelist");
    assert_eq!(query.get("hostname"), Some("web01"));
    assert!(!query.contains_key("servicedescription"));
}

#[test]
fn description_without_host_is_ignored() {
    let (tools, gateway, _) = catalog(RecordingGateway::default());

    let _ = tools.get_service_status(None, Some("HTTP"), None, None, None);

    let (_, query) = gateway.only_query();
    assert_eq!(query.keys(), vec!["query"]);
    assert_eq!(query.discriminator(), "servicelist");
}

#[test]
fn group_tools_delegate_with_group_filters() {
    let (tools, gateway, _) = catalog(RecordingGateway::default());
    let states = NameFilter::many(["critical"]);

    let _ = tools.get_hosts_in_group_status("linux", None);
    let _ = tools.get_services_in_group_status("payments", Some(&states));
    let _ = tools.get_services_on_host_in_group_status("linux", "web01", None);

    let calls = gateway.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].1.discriminator(), "hostlist");
    assert_eq!(calls[0].1.get("hostgroup"), Some("linux"));
    assert_eq!(calls[1].1.discriminator(), "servicelist");
    assert_eq!(calls[1].1.get("servicegroup"), Some("payments"));
    assert_eq!(calls[1].1.get("servicestatus"), Some("critical"));
    assert_eq!(calls[2].1.discriminator(), "servicelist");
    assert_eq!(calls[2].1.get("hostname"), Some("web01"));
    assert_eq!(calls[2].1.get("hostgroup"), Some("linux"));
}

// ============================================================================
// SECTION: Upstream Failures
// ============================================================================

#[test]
fn semantic_failure_yields_none_for_single_call_tools() {
    let (tools, _, _) = catalog(failing(&[
        "hostlist",
        "host",
        "servicelist",
        "programstatus",
        "hostlist",
        "commentlist",
        "comment",
        "downtimelist",
        "hostdependencylist",
        "servicedependencylist",
        "contact",
    ]));

    assert_eq!(tools.get_host_status(None, None, None), None);
    assert_eq!(tools.get_host_status(Some("h1"), None, None), None);
    assert_eq!(tools.get_service_status(None, None, None, None, None), None);
    assert_eq!(tools.get_program_status(), None);
    assert_eq!(tools.get_nagios_process_info(), None);
    assert_eq!(tools.get_hosts_in_group_status("linux", None), None);
    assert_eq!(tools.get_comments(None, None, DEFAULT_LIMIT), None);
    assert_eq!(tools.get_comment_by_id("7"), None);
    assert_eq!(tools.get_downtimes(None, None, false, DEFAULT_LIMIT), None);
    assert_eq!(tools.get_host_dependencies(None, None, None), None);
    assert_eq!(tools.get_service_dependencies(None, None, None, None), None);
    assert_eq!(tools.get_object_list_config("hosts"), None);
    assert_eq!(tools.get_single_object_config("contact", "admin", None), None);
    assert_eq!(tools.get_contacts_for_object("contact", "admin", None), None);
}

#[test]
fn missing_payload_key_yields_none() {
    let (tools, _, _) = catalog(RecordingGateway::default().data("programstatus", json!({})));

    assert_eq!(tools.get_program_status(), None);
}

// ============================================================================
// SECTION: Composite Tools
// ============================================================================

#[test]
fn alerts_issue_two_filtered_calls_and_merge() {
    let (tools, gateway, _) = catalog(
        RecordingGateway::default()
            .data("hostlist", json!({"hostlist": {"db01": {"status": 4}}}))
            .data("servicelist", json!({"servicelist": {"web01": {"HTTP": {"status": 16}}}})),
    );

    let alerts = tools.get_alerts();

    assert_eq!(alerts.hosts, Some(json!({"db01": {"status": 4}})));
    assert_eq!(alerts.services, Some(json!({"web01": {"HTTP": {"status": 16}}})));
    let calls = gateway.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1.get("hoststatus"), Some("down unreachable"));
    assert_eq!(calls[1].1.get("servicestatus"), Some("warning critical unknown"));
}

#[test]
fn alerts_tolerate_one_failed_half() {
    let (tools, gateway, _) = catalog(
        failing(&["servicelist"]).data("hostlist", json!({"hostlist": {"db01": {"status": 4}}})),
    );

    let alerts = tools.get_alerts();

    assert_eq!(alerts.hosts, Some(json!({"db01": {"status": 4}})));
    assert_eq!(alerts.services, None);
    assert_eq!(gateway.calls().len(), 2);
    assert_eq!(
        serde_json::to_value(&alerts).unwrap(),
        json!({"hosts": {"db01": {"status": 4}}, "services": null})
    );
}

#[test]
fn health_summary_merges_counts() {
    let (tools, gateway, _) = catalog(
        RecordingGateway::default()
            .data("hostcount", json!({"hostcount": {"up": 10, "down": 1}}))
            .data("servicecount", json!({"servicecount": {"ok": 40}})),
    );

    let summary = tools.get_overall_health_summary();

    assert_eq!(summary.host_counts, Some(json!({"up": 10, "down": 1})));
    assert_eq!(summary.service_counts, Some(json!({"ok": 40})));
    let calls = gateway.calls();
    assert_eq!(calls[0].1.keys(), vec!["query"]);
    assert_eq!(calls[1].1.discriminator(), "servicecount");
}

#[test]
fn unhandled_problems_keep_observed_acknowledgement_polarity() {
    let (tools, _, _) = catalog(
        RecordingGateway::default()
            .data(
                "hostlist",
                json!({"hostlist": {
                    "fresh": {"problem_has_been_acknowledged": false, "scheduled_downtime_depth": 0},
                    "acked": {"problem_has_been_acknowledged": true, "scheduled_downtime_depth": 0},
                    "in_downtime": {"problem_has_been_acknowledged": false, "scheduled_downtime_depth": 1}
                }}),
            )
            .data(
                "servicelist",
                json!({"servicelist": {"web01": {
                    "HTTP": {"problem_has_been_acknowledged": true, "scheduled_downtime_depth": 0},
                    "SSH": {"problem_has_been_acknowledged": false, "scheduled_downtime_depth": 0},
                    "DNS": {"problem_has_been_acknowledged": true, "scheduled_downtime_depth": 2}
                }}}),
            ),
    );

    let problems = tools.get_unhandled_problems("all");

    assert_eq!(
        problems.hosts,
        vec![json!({"fresh": {"problem_has_been_acknowledged": false, "scheduled_downtime_depth": 0}})]
    );
    assert_eq!(
        problems.services,
        vec![json!({"web01": {"HTTP": {"problem_has_been_acknowledged": true, "scheduled_downtime_depth": 0}}})]
    );
}

#[test]
fn unhandled_problems_treat_missing_fields_like_upstream_defaults() {
    let (tools, _, _) = catalog(
        RecordingGateway::default().data("hostlist", json!({"hostlist": {"bare": {"status": 4}}})),
    );

    let problems = tools.get_unhandled_problems("host");

    assert_eq!(problems.hosts, vec![json!({"bare": {"status": 4}})]);
    assert!(problems.services.is_empty());
}

#[test]
fn unhandled_problems_scope_controls_calls() {
    let (tools, gateway, _) = catalog(RecordingGateway::default());

    let _ = tools.get_unhandled_problems("service");
    let unknown = tools.get_unhandled_problems("everything");

    let calls = gateway.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1.discriminator(), "servicelist");
    assert_eq!(unknown, UnhandledProblems::default());
}

#[test]
fn contacts_for_object_fan_out_per_member() {
    let (tools, gateway, _) = catalog(
        RecordingGateway::default()
            .data(
                "host",
                json!({"host": {"name": "web01", "contacts": ["alice", "bob"], "contact_groups": ["admins"]}}),
            )
            .data("contact", json!({"contact": {"name": "member"}}))
            .data("contactgroup", json!({"contactgroup": {"name": "admins"}})),
    );

    let info = tools.get_contacts_for_object("host", "web01", None).expect("contacts");

    assert_eq!(info.contacts.len(), 2);
    assert_eq!(info.contact_groups, vec![json!({"name": "admins"})]);
    let calls = gateway.calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[1].1.get("contactname"), Some("alice"));
    assert_eq!(calls[2].1.get("contactname"), Some("bob"));
    assert_eq!(calls[3].1.get("contactgroup"), Some("admins"));
    assert!(calls.iter().all(|(endpoint, _)| *endpoint == CgiEndpoint::ObjectJson));
}

#[test]
fn contacts_for_object_skip_failed_member_lookups() {
    let (tools, _, _) = catalog(
        failing(&["contact"])
            .data("host", json!({"host": {"contacts": ["ghost"]}})),
    );

    let info = tools.get_contacts_for_object("host", "web01", None).expect("contacts");

    assert_eq!(info, ContactInfo::default());
}

#[test]
fn contacts_for_service_without_description_is_none() {
    let (tools, gateway, sink) = catalog(RecordingGateway::default());

    assert_eq!(tools.get_contacts_for_object("service", "web01", None), None);
    assert!(gateway.calls().is_empty());
    assert_eq!(sink.events().len(), 1);
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

#[test]
fn object_list_uses_fixed_plural_table() {
    let expected = [
        ("hosts", "hostlist"),
        ("services", "servicelist"),
        ("hostgroups", "hostgrouplist"),
        ("servicegroups", "servicegrouplist"),
        ("contacts", "contactlist"),
        ("contactgroups", "contactgrouplist"),
        ("timeperiods", "timeperiodlist"),
        ("commands", "commandlist"),
    ];
    for (plural, discriminator) in expected {
        let (tools, gateway, _) = catalog(
            RecordingGateway::default().data(discriminator, json!({ discriminator: {"x": {}} })),
        );
        assert_eq!(tools.get_object_list_config(plural), Some(json!({"x": {}})));
        let (endpoint, query) = gateway.only_query();
        assert_eq!(endpoint, CgiEndpoint::ObjectJson);
        assert_eq!(query.discriminator(), discriminator);
    }
}

#[test]
fn object_list_type_is_case_insensitive() {
    let (tools, gateway, _) = catalog(RecordingGateway::default());

    let _ = tools.get_object_list_config("HostGroups");

    assert_eq!(gateway.only_query().1.discriminator(), "hostgrouplist");
}

#[test]
fn unsupported_object_list_type_never_calls_gateway() {
    let (tools, gateway, sink) = catalog(RecordingGateway::default());

    assert_eq!(tools.get_object_list_config("widgets"), None);

    assert!(gateway.calls().is_empty());
    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, DiagnosticKind::Validation);
    assert_eq!(events[0].tool, Some("get_object_list_config"));
}

#[test]
fn service_config_without_description_never_calls_gateway() {
    let (tools, gateway, sink) = catalog(RecordingGateway::default());

    assert_eq!(tools.get_single_object_config("service", "web01", None), None);
    assert_eq!(tools.get_single_object_config("service", "web01", Some("")), None);

    assert!(gateway.calls().is_empty());
    assert_eq!(sink.events().len(), 2);
}

#[test]
fn service_config_sends_host_and_description() {
    let (tools, gateway, _) =
        catalog(RecordingGateway::default().data("service", json!({"service": {"check": "http"}})));

    let result = tools.get_single_object_config("Service", "web01", Some("HTTP"));

    assert_eq!(result, Some(json!({"check": "http"})));
    let (endpoint, query) = gateway.only_query();
    assert_eq!(endpoint, CgiEndpoint::ObjectJson);
    assert_eq!(query.keys(), vec!["query", "hostname", "servicedescription"]);
    assert_eq!(query.get("hostname"), Some("web01"));
    assert_eq!(query.get("servicedescription"), Some("HTTP"));
}

#[test]
fn single_object_queries_carry_only_the_identifying_field() {
    let expected = [
        ("host", "hostname"),
        ("hostgroup", "hostgroup"),
        ("servicegroup", "servicegroup"),
        ("contact", "contactname"),
        ("contactgroup", "contactgroup"),
        ("timeperiod", "timeperiod"),
        ("command", "command"),
    ];
    for (object_type, field) in expected {
        let (tools, gateway, _) = catalog(RecordingGateway::default());
        let _ = tools.get_single_object_config(object_type, "thing", Some("ignored"));
        let (_, query) = gateway.only_query();
        assert_eq!(query.discriminator(), object_type);
        assert_eq!(query.keys(), vec!["query", field]);
        assert_eq!(query.get(field), Some("thing"));
    }
}

#[test]
fn unsupported_single_object_type_never_calls_gateway() {
    let (tools, gateway, sink) = catalog(RecordingGateway::default());

    assert_eq!(tools.get_single_object_config("hostescalation", "x", None), None);

    assert!(gateway.calls().is_empty());
    assert_eq!(sink.events()[0].kind, DiagnosticKind::Validation);
}

#[test]
fn host_dependencies_prefer_host_name_over_dependent_host() {
    let (tools, gateway, _) = catalog(
        RecordingGateway::default()
            .data("hostdependencylist", json!({"hostdependencylist": [{"master_host_name": "core"}]})),
    );

    let result = tools.get_host_dependencies(Some("web01"), Some("core"), Some("ignored"));
    let _ = tools.get_host_dependencies(None, None, Some("db01"));

    assert_eq!(result, Some(json!({"hostdependencylist": [{"master_host_name": "core"}]})));
    let calls = gateway.calls();
    assert_eq!(calls[0].0, CgiEndpoint::ObjectJson);
    assert_eq!(calls[0].1.get_all("dependenthostname"), vec!["web01"]);
    assert_eq!(calls[0].1.get("masterhostname"), Some("core"));
    assert_eq!(calls[1].1.get("dependenthostname"), Some("db01"));
}

#[test]
fn service_dependencies_map_every_filter() {
    let (tools, gateway, _) = catalog(RecordingGateway::default());

    let _ = tools.get_service_dependencies(Some("web01"), Some("HTTP"), Some("db01"), Some("MySQL"));

    let (endpoint, query) = gateway.only_query();
    assert_eq!(endpoint, CgiEndpoint::ObjectJson);
    assert_eq!(query.discriminator(), "servicedependencylist");
    assert_eq!(query.get("dependenthostname"), Some("web01"));
    assert_eq!(query.get("dependentservicedescription"), Some("HTTP"));
    assert_eq!(query.get("masterhostname"), Some("db01"));
    assert_eq!(query.get("masterservicedescription"), Some("MySQL"));
}

// ============================================================================
// SECTION: Comments and Downtime
// ============================================================================

#[test]
fn comments_carry_limit_as_count() {
    let (tools, gateway, _) = catalog(RecordingGateway::default());

    let _ = tools.get_comments(None, None, 10);
    let _ = tools.get_comments(Some("web01"), Some("HTTP"), DEFAULT_LIMIT);

    let calls = gateway.calls();
    assert_eq!(calls[0].1.get("count"), Some("10"));
    assert_eq!(calls[1].1.get("count"), Some("50"));
    assert_eq!(calls[1].1.get("hostname"), Some("web01"));
    assert_eq!(calls[1].1.get("servicedescription"), Some("HTTP"));
}

#[test]
fn comment_by_id_projects_comment() {
    let (tools, gateway, _) =
        catalog(RecordingGateway::default().data("comment", json!({"comment": {"comment_id": 7}})));

    assert_eq!(tools.get_comment_by_id("7"), Some(json!({"comment_id": 7})));
    assert_eq!(gateway.only_query().1.get("commentid"), Some("7"));
}

#[test]
fn downtimes_mark_active_only_as_in_effect() {
    let (tools, gateway, _) = catalog(
        RecordingGateway::default().data("downtimelist", json!({"downtimelist": {"3": {}}})),
    );

    assert_eq!(tools.get_downtimes(None, None, true, 5), Some(json!({"3": {}})));
    let _ = tools.get_downtimes(Some("web01"), None, false, DEFAULT_LIMIT);

    let calls = gateway.calls();
    assert_eq!(calls[0].1.get("ineffect"), Some("yes"));
    assert_eq!(calls[0].1.get("count"), Some("5"));
    assert!(!calls[1].1.contains_key("ineffect"));
    assert_eq!(calls[1].1.get("hostname"), Some("web01"));
}
