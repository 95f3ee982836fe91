// crates/nagios-mcp/src/tools/tests.rs
// ============================================================================
// Module: MCP Tool Router Unit Tests
// Description: Unit tests for tool-call argument decoding and dispatch.
// Purpose: Validate routing, defaults, and error classification.
// Dependencies: nagios-mcp, nagios-mcp-gateway
// ============================================================================

//! ## Overview
//! Exercises [`ToolRouter`] end to end over a recording gateway: argument
//! decoding, default values, result serialization, and routing errors.

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

use std::sync::Arc;

use serde_json::Value;
use serde_json::json;

use super::*;
use crate::tests::RecordingGateway;
use crate::tests::RecordingSink;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn router(gateway: RecordingGateway) -> (ToolRouter, Arc<RecordingGateway>) {
    let gateway = Arc::new(gateway);
    let router = ToolRouter::from_gateway(gateway.clone(), Arc::new(RecordingSink::default()));
    (router, gateway)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn list_tools_returns_every_tool() {
    let (router, _) = router(RecordingGateway::default());
    let names: Vec<ToolName> = router.list_tools().into_iter().map(|tool| tool.name).collect();
    assert_eq!(names, ToolName::all().to_vec());
}

#[test]
fn unknown_tool_is_rejected_without_upstream_call() {
    let (router, gateway) = router(RecordingGateway::default());

    let err = router.handle_tool_call("restart_nagios", json!({})).unwrap_err();

    assert!(matches!(err, ToolError::UnknownTool(name) if name == "restart_nagios"));
    assert!(gateway.calls().is_empty());
}

#[test]
fn missing_required_argument_is_invalid_params() {
    let (router, gateway) = router(RecordingGateway::default());

    let err = router
        .handle_tool_call("get_single_object_config", json!({"object_type_singular": "host"}))
        .unwrap_err();

    assert!(matches!(err, ToolError::InvalidParams(message) if message.contains("object_name")));
    assert!(gateway.calls().is_empty());
}

#[test]
fn wrongly_typed_argument_is_invalid_params() {
    let (router, _) = router(RecordingGateway::default());

    let err = router.handle_tool_call("get_comments", json!({"limit": "ten"})).unwrap_err();

    assert!(matches!(err, ToolError::InvalidParams(_)));
}

#[test]
fn null_arguments_decode_as_empty_object() {
    let (router, gateway) = router(
        RecordingGateway::default().data("hostlist", json!({"hostlist": {"h1": {"status": "up"}}})),
    );

    let result = router.handle_tool_call("get_host_status", Value::Null).unwrap();

    assert_eq!(result, json!({"h1": {"status": "up"}}));
    assert_eq!(gateway.only_query().1.discriminator(), "hostlist");
}

#[test]
fn comments_default_limit_is_fifty() {
    let (router, gateway) = router(RecordingGateway::default());

    let result = router.handle_tool_call("get_comments", json!({})).unwrap();

    assert_eq!(result, Value::Null);
    assert_eq!(gateway.only_query().1.get("count"), Some("50"));
}

#[test]
fn filters_accept_string_or_list() {
    let (router, gateway) = router(RecordingGateway::default());

    router
        .handle_tool_call(
            "get_service_status",
            json!({"service_status_filter": ["warning", "critical"], "host_group_filter": "web"}),
        )
        .unwrap();

    let (_, query) = gateway.only_query();
    assert_eq!(query.get("servicestatus"), Some("warning critical"));
    assert_eq!(query.get_all("hostgroup"), vec!["web"]);
}

#[test]
fn comment_id_accepts_numbers() {
    let (router, gateway) = router(RecordingGateway::default());

    router.handle_tool_call("get_comment_by_id", json!({"comment_id": 42})).unwrap();

    assert_eq!(gateway.only_query().1.get("commentid"), Some("42"));
}

#[test]
fn downtimes_active_only_defaults_to_false() {
    let (router, gateway) = router(RecordingGateway::default());

    router.handle_tool_call("get_downtimes", json!({"host_name": "web01"})).unwrap();
    router.handle_tool_call("get_downtimes", json!({"active_only": true, "limit": 3})).unwrap();

    let calls = gateway.calls();
    assert!(!calls[0].1.contains_key("ineffect"));
    assert_eq!(calls[1].1.get("ineffect"), Some("yes"));
    assert_eq!(calls[1].1.get("count"), Some("3"));
}

#[test]
fn unhandled_problems_default_to_all() {
    let (router, gateway) = router(RecordingGateway::default());

    let result = router.handle_tool_call("get_unhandled_problems", json!({})).unwrap();

    assert_eq!(result, json!({"hosts": [], "services": []}));
    assert_eq!(gateway.calls().len(), 2);
}

#[test]
fn composite_results_serialize_with_null_slots() {
    let (router, _) = router(
        RecordingGateway::default().data("hostcount", json!({"hostcount": {"up": 3}})),
    );

    let result = router.handle_tool_call("get_overall_health_summary", json!({})).unwrap();

    assert_eq!(result, json!({"host_counts": {"up": 3}, "service_counts": null}));
}

#[test]
fn process_info_matches_program_status() {
    let (router, gateway) = router(
        RecordingGateway::default().data("programstatus", json!({"programstatus": {"nagios_pid": 1}})),
    );

    let program = router.handle_tool_call("get_program_status", json!({})).unwrap();
    let process = router.handle_tool_call("get_nagios_process_info", json!({})).unwrap();

    assert_eq!(program, process);
    assert_eq!(program, json!({"nagios_pid": 1}));
    assert!(gateway.calls().iter().all(|(_, query)| query.discriminator() == "programstatus"));
}

#[test]
fn contacts_for_object_returns_null_when_lookup_fails() {
    let (router, _) = router(RecordingGateway::default());

    let result = router
        .handle_tool_call("get_contacts_for_object", json!({"object_type": "host", "object_name": "x"}))
        .unwrap();

    assert_eq!(result, Value::Null);
}
