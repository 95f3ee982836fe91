// crates/nagios-mcp-gateway/tests/gateway_http.rs
// ============================================================================
// Module: Gateway HTTP Tests
// Description: End-to-end gateway tests against a local stub CGI server.
// Purpose: Verify request shaping, envelope unwrapping, and failure classification.
// Dependencies: nagios-mcp-gateway, nagios-mcp-config, tiny_http
// ============================================================================

//! ## Overview
//! Each test starts a one-shot `tiny_http` server that plays the role of the
//! Nagios CGI, captures what the gateway sent, and replies with a canned body.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::net::TcpListener;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::mpsc;
use std::thread;

use nagios_mcp_config::UpstreamConfig;
use nagios_mcp_gateway::CgiEndpoint;
use nagios_mcp_gateway::CgiGateway;
use nagios_mcp_gateway::CgiQuery;
use nagios_mcp_gateway::DiagnosticEvent;
use nagios_mcp_gateway::DiagnosticKind;
use nagios_mcp_gateway::DiagnosticSink;
use nagios_mcp_gateway::GatewayError;
use nagios_mcp_gateway::RequestGateway;
use serde_json::json;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Helpers
// ============================================================================

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl DiagnosticSink for RecordingSink {
    fn record(&self, event: &DiagnosticEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Request details captured by the stub server.
struct Captured {
    url: String,
    authorization: Option<String>,
}

/// Starts a stub that answers one request and reports what it received.
fn stub(status: u16, body: &'static str) -> (String, mpsc::Receiver<Captured>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let authorization = request
                .headers()
                .iter()
                .find(|header| header.field.equiv("Authorization"))
                .map(|header| header.value.as_str().to_string());
            let _ = tx.send(Captured {
                url: request.url().to_string(),
                authorization,
            });
            let _ = request.respond(Response::from_string(body).with_status_code(status));
        }
    });
    (format!("http://{addr}/nagios"), rx)
}

fn upstream(base_url: String, username: Option<&str>) -> UpstreamConfig {
    UpstreamConfig {
        base_url,
        username: username.map(str::to_string),
        password: username.map(|_| "secret".to_string()),
        timeout_ms: 5_000,
        ..UpstreamConfig::default()
    }
}

fn gateway(config: UpstreamConfig) -> (RequestGateway, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let gateway = RequestGateway::new(config, sink.clone()).unwrap();
    (gateway, sink)
}

// ============================================================================
// SECTION: Success Path
// ============================================================================

#[test]
fn success_unwraps_data_and_shapes_request() {
    let (base_url, captured) = stub(
        200,
        r#"{"result":{"type_code":0,"message":"OK"},"data":{"hostlist":{"web01":{"status":2}}}}"#,
    );
    let (gateway, sink) = gateway(upstream(base_url, Some("nagiosadmin")));

    let data = gateway
        .request(CgiEndpoint::StatusJson, CgiQuery::new("hostlist").with("hoststatus", "down"))
        .expect("data");

    assert_eq!(data, json!({"hostlist": {"web01": {"status": 2}}}));
    let captured = captured.recv().unwrap();
    assert!(captured.url.starts_with("/nagios/cgi-bin/statusjson.cgi?"));
    assert!(captured.url.contains("query=hostlist"));
    assert!(captured.url.contains("hoststatus=down"));
    assert!(captured.url.contains("details=true"));
    let authorization = captured.authorization.expect("authorization header");
    assert!(authorization.starts_with("Basic "));
    assert!(sink.events().is_empty());
}

#[test]
fn anonymous_requests_send_no_credentials() {
    let (base_url, captured) = stub(200, r#"{"result":{"type_code":0},"data":{"programstatus":{}}}"#);
    let (gateway, _sink) = gateway(upstream(base_url, None));

    let data = gateway.request(CgiEndpoint::StatusJson, CgiQuery::new("programstatus"));

    assert_eq!(data, Some(json!({"programstatus": {}})));
    let captured = captured.recv().unwrap();
    assert!(captured.authorization.is_none());
    assert!(!captured.url.contains("details"));
}

#[test]
fn object_endpoint_uses_objectjson_script() {
    let (base_url, captured) = stub(200, r#"{"result":{"type_code":0},"data":{"contactlist":{}}}"#);
    let (gateway, _sink) = gateway(upstream(base_url, Some("u")));

    let data = gateway.request(CgiEndpoint::ObjectJson, CgiQuery::new("contactlist"));

    assert!(data.is_some());
    assert!(captured.recv().unwrap().url.starts_with("/nagios/cgi-bin/objectjson.cgi?"));
}

#[test]
fn format_options_are_forwarded() {
    let (base_url, captured) = stub(200, r#"{"result":{"type_code":0},"data":{}}"#);
    let mut config = upstream(base_url, Some("u"));
    config.format_options = Some("enumerate".to_string());
    let (gateway, _sink) = gateway(config);

    let _ = gateway.request(CgiEndpoint::StatusJson, CgiQuery::new("hostcount"));

    assert!(captured.recv().unwrap().url.contains("formatoptions=enumerate"));
}

// ============================================================================
// SECTION: Failure Classification
// ============================================================================

#[test]
fn upstream_type_code_failure_returns_none_and_logs() {
    let (base_url, _captured) =
        stub(200, r#"{"result":{"type_code":1,"message":"Host not found"},"data":{}}"#);
    let (gateway, sink) = gateway(upstream(base_url, Some("u")));

    let data =
        gateway.request(CgiEndpoint::StatusJson, CgiQuery::new("host").with("hostname", "ghost"));

    assert!(data.is_none());
    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, DiagnosticKind::UpstreamSemantic);
    assert_eq!(events[0].message, "cgi error: Host not found");
    assert_eq!(events[0].endpoint, Some(CgiEndpoint::StatusJson));
    assert_eq!(events[0].query.as_ref().unwrap().get("hostname"), Some("ghost"));
}

#[test]
fn http_error_is_transport_failure_with_status() {
    let (base_url, _captured) = stub(500, "internal error");
    let (gateway, sink) = gateway(upstream(base_url, Some("u")));

    let err = gateway.try_request(CgiEndpoint::StatusJson, CgiQuery::new("hostlist")).unwrap_err();

    match err {
        GatewayError::Transport {
            status,
            body,
            ..
        } => {
            assert_eq!(status, Some(500));
            assert_eq!(body.as_deref(), Some("internal error"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(sink.events().is_empty());
}

#[test]
fn unauthorized_response_is_transport_failure() {
    let (base_url, _captured) = stub(401, r#"{"result":{"type_code":0},"data":{}}"#);
    let (gateway, sink) = gateway(upstream(base_url, Some("u")));

    assert!(gateway.request(CgiEndpoint::StatusJson, CgiQuery::new("hostlist")).is_none());

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, DiagnosticKind::Transport);
    assert_eq!(events[0].status, Some(401));
}

#[test]
fn non_json_body_is_decode_failure() {
    let (base_url, _captured) = stub(200, "<html>Login required</html>");
    let (gateway, sink) = gateway(upstream(base_url, Some("u")));

    assert!(gateway.request(CgiEndpoint::ObjectJson, CgiQuery::new("hostlist")).is_none());

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, DiagnosticKind::Decode);
}

#[test]
fn unreachable_upstream_is_transport_failure() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let (gateway, sink) = gateway(upstream(format!("http://127.0.0.1:{port}"), None));

    assert!(gateway.request(CgiEndpoint::StatusJson, CgiQuery::new("programstatus")).is_none());

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, DiagnosticKind::Transport);
    assert_eq!(events[0].status, None);
}
