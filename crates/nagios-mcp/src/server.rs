// crates/nagios-mcp/src/server.rs
// ============================================================================
// Module: MCP Server
// Description: JSON-RPC server for the Nagios tools over stdio or HTTP+SSE.
// Purpose: Expose tools/list and tools/call through interchangeable transports.
// Dependencies: axum, nagios-mcp-config, nagios-mcp-gateway, tokio, tokio-stream
// ============================================================================

//! ## Overview
//! One request handler serves both transports. The stdio transport reads
//! newline-delimited or `Content-Length` framed JSON-RPC messages and answers
//! in the framing of each request. The SSE transport opens an event stream on
//! `GET /sse`, announces a per-session `POST /messages/` endpoint, and delivers
//! replies as `message` events on that stream.
//!
//! Tool calls run the blocking gateway client under `block_in_place` so the
//! async transports are never stalled by an upstream request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::task::Context;
use std::task::Poll;

use axum::Router;
use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::response::sse::Event;
use axum::response::sse::KeepAlive;
use axum::response::sse::KeepAliveStream;
use axum::response::sse::Sse;
use axum::routing::get;
use axum::routing::post;
use nagios_mcp_config::NagiosConfig;
use nagios_mcp_config::ServerConfig;
use nagios_mcp_config::ServerTransport;
use nagios_mcp_gateway::DiagnosticSink;
use nagios_mcp_gateway::RequestGateway;
use nagios_mcp_gateway::StderrDiagnosticSink;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::runtime::Handle;
use tokio::runtime::RuntimeFlavor;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_stream::Stream;
use tokio_stream::wrappers::ReceiverStream;

use crate::audit::McpAuditEvent;
use crate::audit::McpAuditSink;
use crate::audit::McpMethod;
use crate::audit::McpStderrAuditSink;
use crate::tooling::ToolName;
use crate::tools::ToolError;
use crate::tools::ToolRouter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Server name reported during initialization.
pub const SERVER_NAME: &str = "nagios";
/// Protocol version offered when the client requests an unknown one.
pub const LATEST_PROTOCOL_VERSION: &str = "2025-06-18";
/// Protocol versions the server can speak.
const SUPPORTED_PROTOCOL_VERSIONS: [&str; 3] = [LATEST_PROTOCOL_VERSION, "2025-03-26", "2024-11-05"];
/// JSON-RPC protocol version.
const JSONRPC_VERSION: &str = "2.0";
/// Maximum size of a `Content-Length` header block.
const MAX_HEADER_BYTES: usize = 8 * 1024;
/// Path of the SSE event stream.
const SSE_PATH: &str = "/sse";
/// Path accepting client-to-server messages.
const MESSAGES_PATH: &str = "/messages/";
/// Message path without the trailing slash.
const MESSAGES_PATH_BARE: &str = "/messages";
/// Pending replies buffered per SSE session.
const SESSION_CHANNEL_CAPACITY: usize = 64;

/// JSON-RPC parse error.
const PARSE_ERROR: i64 = -32700;
/// JSON-RPC invalid request.
const INVALID_REQUEST: i64 = -32600;
/// JSON-RPC method not found.
const METHOD_NOT_FOUND: i64 = -32601;
/// JSON-RPC invalid params.
const INVALID_PARAMS: i64 = -32602;
/// JSON-RPC internal error.
const INTERNAL_ERROR: i64 = -32603;

// ============================================================================
// SECTION: JSON-RPC Types
// ============================================================================

/// Inbound JSON-RPC message.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version; must be `2.0`.
    pub jsonrpc: String,
    /// Request id; absent for notifications.
    #[serde(default)]
    pub id: Option<Value>,
    /// Method name.
    pub method: String,
    /// Method parameters.
    #[serde(default)]
    pub params: Option<Value>,
}

/// Outbound JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version.
    pub jsonrpc: String,
    /// Id of the request being answered.
    pub id: Value,
    /// Successful result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Builds a success response.
    fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Builds an error response.
    fn failure(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i64,
    /// Error message.
    pub message: String,
}

impl JsonRpcError {
    /// Builds an error payload.
    fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<ToolError> for JsonRpcError {
    fn from(error: ToolError) -> Self {
        let code = match error {
            ToolError::UnknownTool(_) | ToolError::InvalidParams(_) => INVALID_PARAMS,
            ToolError::Serialization(_) => INTERNAL_ERROR,
        };
        Self::new(code, error.to_string())
    }
}

/// Parameters of `tools/call`.
#[derive(Debug, Deserialize)]
struct ToolCallParams {
    /// Tool wire name.
    name: String,
    /// Tool arguments.
    #[serde(default)]
    arguments: Value,
}

/// Result payload of `tools/call`.
#[derive(Debug, Serialize)]
struct ToolCallResult {
    /// Tool output content.
    content: Vec<ToolContent>,
    /// Whether the tool reported a failure.
    #[serde(rename = "isError")]
    is_error: bool,
}

/// Tool output content blocks.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ToolContent {
    /// Serialized JSON tool output.
    Text {
        /// JSON text.
        text: String,
    },
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Nagios MCP server.
pub struct McpServer {
    /// Server settings.
    config: ServerConfig,
    /// Shared request handling state.
    state: Arc<ServerState>,
}

/// Request handling state shared by every transport.
pub(crate) struct ServerState {
    /// Tool dispatcher.
    router: ToolRouter,
    /// Request audit sink.
    audit: Arc<dyn McpAuditSink>,
    /// Transport label for audit events.
    transport: ServerTransport,
    /// Maximum inbound message size.
    max_body_bytes: usize,
}

impl McpServer {
    /// Builds a server, its gateway, and stderr sinks from configuration.
    ///
    /// The gateway owns a blocking HTTP client; call this outside async
    /// contexts (e.g. via `spawn_blocking`).
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when configuration is invalid or the gateway
    /// cannot be created.
    pub fn from_config(config: NagiosConfig) -> Result<Self, McpServerError> {
        config.validate().map_err(|err| McpServerError::Config(err.to_string()))?;
        let diagnostics: Arc<dyn DiagnosticSink> = Arc::new(StderrDiagnosticSink);
        let gateway = RequestGateway::new(config.upstream, Arc::clone(&diagnostics))
            .map_err(|err| McpServerError::Init(err.to_string()))?;
        let router = ToolRouter::from_gateway(Arc::new(gateway), diagnostics);
        Ok(Self::new(config.server, router, Arc::new(McpStderrAuditSink)))
    }

    /// Builds a server from pre-built parts.
    #[must_use]
    pub fn new(config: ServerConfig, router: ToolRouter, audit: Arc<dyn McpAuditSink>) -> Self {
        let state = Arc::new(ServerState {
            router,
            audit,
            transport: config.transport,
            max_body_bytes: config.max_body_bytes,
        });
        Self {
            config,
            state,
        }
    }

    /// Serves the configured transport until EOF or a transport failure.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when the transport fails.
    pub async fn serve(self) -> Result<(), McpServerError> {
        match self.config.transport {
            ServerTransport::Stdio => {
                let mut reader = BufReader::new(tokio::io::stdin());
                let mut writer = tokio::io::stdout();
                self.serve_streams(&mut reader, &mut writer).await
            }
            ServerTransport::Sse => {
                serve_sse(Arc::clone(&self.state), &self.config.host, self.config.port).await
            }
        }
    }

    /// Serves JSON-RPC messages from `reader`, writing replies to `writer`.
    ///
    /// Returns cleanly at end of input.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError::Transport`] on framing or I/O failures.
    pub async fn serve_streams<R, W>(
        &self,
        reader: &mut R,
        writer: &mut W,
    ) -> Result<(), McpServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let state = &self.state;
        while let Some(message) = read_message(reader, state.max_body_bytes).await? {
            let response = match decode_request(&message.payload) {
                Ok(request) => handle_request(state, request, message.payload.len()),
                Err(error) => {
                    state.record(McpMethod::Invalid, None, Some(error.code), message.payload.len());
                    Some(JsonRpcResponse::failure(Value::Null, error))
                }
            };
            if let Some(response) = response {
                write_message(writer, message.framing, &response).await?;
            }
        }
        Ok(())
    }
}

impl ServerState {
    /// Records an audit event for one handled message.
    fn record(
        &self,
        method: McpMethod,
        tool: Option<ToolName>,
        error_code: Option<i64>,
        request_bytes: usize,
    ) {
        self.audit.record(&McpAuditEvent::new(
            self.transport,
            method,
            tool,
            error_code,
            request_bytes,
        ));
    }
}

// ============================================================================
// SECTION: Request Handling
// ============================================================================

/// Decodes a JSON-RPC message.
fn decode_request(bytes: &[u8]) -> Result<JsonRpcRequest, JsonRpcError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|err| JsonRpcError::new(PARSE_ERROR, format!("parse error: {err}")))?;
    serde_json::from_value(value)
        .map_err(|err| JsonRpcError::new(INVALID_REQUEST, format!("invalid request: {err}")))
}

/// Handles one decoded message; notifications produce no reply.
pub(crate) fn handle_request(
    state: &ServerState,
    request: JsonRpcRequest,
    request_bytes: usize,
) -> Option<JsonRpcResponse> {
    if request.jsonrpc != JSONRPC_VERSION {
        state.record(McpMethod::Invalid, None, Some(INVALID_REQUEST), request_bytes);
        let error = JsonRpcError::new(INVALID_REQUEST, "jsonrpc must be \"2.0\"");
        return request.id.map(|id| JsonRpcResponse::failure(id, error));
    }
    let Some(id) = request.id else {
        state.record(McpMethod::Notification, None, None, request_bytes);
        return None;
    };
    let (method, tool, outcome) = dispatch(state, &request.method, request.params);
    state.record(method, tool, outcome.as_ref().err().map(|error| error.code), request_bytes);
    Some(match outcome {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(error) => JsonRpcResponse::failure(id, error),
    })
}

/// Routes a request to its method handler.
fn dispatch(
    state: &ServerState,
    method: &str,
    params: Option<Value>,
) -> (McpMethod, Option<ToolName>, Result<Value, JsonRpcError>) {
    match method {
        "initialize" => (McpMethod::Initialize, None, Ok(initialize_result(params.as_ref()))),
        "ping" => (McpMethod::Ping, None, Ok(json!({}))),
        "tools/list" => (McpMethod::ToolsList, None, Ok(json!({ "tools": state.router.list_tools() }))),
        "tools/call" => {
            let (tool, outcome) = call_tool(state, params);
            (McpMethod::ToolsCall, tool, outcome)
        }
        other => (
            McpMethod::Other,
            None,
            Err(JsonRpcError::new(METHOD_NOT_FOUND, format!("method not found: {other}"))),
        ),
    }
}

/// Builds the `initialize` result, echoing a supported client version.
fn initialize_result(params: Option<&Value>) -> Value {
    let requested = params.and_then(|params| params.get("protocolVersion")).and_then(Value::as_str);
    let version = requested
        .filter(|version| SUPPORTED_PROTOCOL_VERSIONS.contains(version))
        .unwrap_or(LATEST_PROTOCOL_VERSION);
    json!({
        "protocolVersion": version,
        "capabilities": { "tools": { "listChanged": false } },
        "serverInfo": { "name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION") }
    })
}

/// Executes `tools/call` and wraps the result in a text content block.
fn call_tool(
    state: &ServerState,
    params: Option<Value>,
) -> (Option<ToolName>, Result<Value, JsonRpcError>) {
    let params: ToolCallParams = match params.map(serde_json::from_value).transpose() {
        Ok(Some(params)) => params,
        Ok(None) => return (None, Err(JsonRpcError::new(INVALID_PARAMS, "missing params"))),
        Err(err) => {
            return (None, Err(JsonRpcError::new(INVALID_PARAMS, format!("invalid params: {err}"))));
        }
    };
    let tool = ToolName::parse(&params.name);
    let outcome = run_blocking(|| state.router.handle_tool_call(&params.name, params.arguments))
        .map_err(JsonRpcError::from)
        .and_then(|result| {
            let internal = |err: serde_json::Error| JsonRpcError::new(INTERNAL_ERROR, err.to_string());
            let text = serde_json::to_string(&result).map_err(internal)?;
            let result = ToolCallResult {
                content: vec![ToolContent::Text {
                    text,
                }],
                is_error: false,
            };
            serde_json::to_value(result).map_err(internal)
        });
    (tool, outcome)
}

/// Runs blocking work without stalling async worker threads.
fn run_blocking<T, F>(work: F) -> T
where
    F: FnOnce() -> T + Send,
    T: Send,
{
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(work)
        }
        Ok(_) => std::thread::scope(|scope| match scope.spawn(work).join() {
            Ok(value) => value,
            Err(payload) => std::panic::resume_unwind(payload),
        }),
        Err(_) => work(),
    }
}

// ============================================================================
// SECTION: Stdio Framing
// ============================================================================

/// Wire framing of a stdio message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Framing {
    /// One JSON message per line.
    Line,
    /// `Content-Length` header block followed by the payload.
    ContentLength,
}

/// One inbound stdio message.
#[derive(Debug)]
pub(crate) struct InboundMessage {
    /// Framing the message arrived in.
    pub(crate) framing: Framing,
    /// Raw JSON payload.
    pub(crate) payload: Vec<u8>,
}

/// Reads the next message, detecting its framing; `None` at end of input.
pub(crate) async fn read_message<R>(
    reader: &mut R,
    max_body_bytes: usize,
) -> Result<Option<InboundMessage>, McpServerError>
where
    R: AsyncBufRead + Unpin,
{
    let line_limit = max_body_bytes.max(MAX_HEADER_BYTES);
    loop {
        let Some(line) = read_line_limited(reader, line_limit).await? else {
            return Ok(None);
        };
        let trimmed = line.trim_ascii();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with(b"{") || trimmed.starts_with(b"[") {
            if trimmed.len() > max_body_bytes {
                return Err(McpServerError::Transport("message exceeds max body size".to_string()));
            }
            return Ok(Some(InboundMessage {
                framing: Framing::Line,
                payload: trimmed.to_vec(),
            }));
        }
        let payload = read_framed_body(reader, &line, max_body_bytes).await?;
        return Ok(Some(InboundMessage {
            framing: Framing::ContentLength,
            payload,
        }));
    }
}

/// Reads the rest of a header block and its payload.
async fn read_framed_body<R>(
    reader: &mut R,
    first_line: &[u8],
    max_body_bytes: usize,
) -> Result<Vec<u8>, McpServerError>
where
    R: AsyncBufRead + Unpin,
{
    let mut header_bytes = first_line.len();
    let mut content_length = parse_content_length(first_line)?;
    loop {
        let remaining = MAX_HEADER_BYTES.saturating_sub(header_bytes);
        if remaining == 0 {
            return Err(McpServerError::Transport("header block too large".to_string()));
        }
        let Some(line) = read_line_limited(reader, remaining).await? else {
            return Err(McpServerError::Transport("unexpected end of headers".to_string()));
        };
        header_bytes += line.len();
        if line.trim_ascii().is_empty() {
            break;
        }
        if let Some(length) = parse_content_length(&line)?
            && content_length.replace(length).is_some()
        {
            return Err(McpServerError::Transport("duplicate Content-Length header".to_string()));
        }
    }
    let length = content_length
        .ok_or_else(|| McpServerError::Transport("missing Content-Length header".to_string()))?;
    if length > max_body_bytes {
        return Err(McpServerError::Transport("message exceeds max body size".to_string()));
    }
    let mut payload = vec![0; length];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(|err| McpServerError::Transport(format!("failed to read payload: {err}")))?;
    Ok(payload)
}

/// Parses a header line, returning the value of `Content-Length` if present.
fn parse_content_length(line: &[u8]) -> Result<Option<usize>, McpServerError> {
    let text = std::str::from_utf8(line)
        .map_err(|_| McpServerError::Transport("header is not utf-8".to_string()))?;
    let Some((name, value)) = text.split_once(':') else {
        return Err(McpServerError::Transport("malformed header line".to_string()));
    };
    if !name.trim().eq_ignore_ascii_case("content-length") {
        return Ok(None);
    }
    value
        .trim()
        .parse::<usize>()
        .map(Some)
        .map_err(|_| McpServerError::Transport("invalid Content-Length header".to_string()))
}

/// Reads one line of at most `limit` bytes excluding the newline.
async fn read_line_limited<R>(
    reader: &mut R,
    limit: usize,
) -> Result<Option<Vec<u8>>, McpServerError>
where
    R: AsyncBufRead + Unpin,
{
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    let mut line = Vec::new();
    let read = (&mut *reader)
        .take(cap)
        .read_until(b'\n', &mut line)
        .await
        .map_err(|err| McpServerError::Transport(format!("failed to read input: {err}")))?;
    if read == 0 {
        return Ok(None);
    }
    if line.strip_suffix(b"\n").unwrap_or(&line).len() > limit {
        return Err(McpServerError::Transport("input line too long".to_string()));
    }
    Ok(Some(line))
}

/// Writes a response in the given framing.
async fn write_message<W>(
    writer: &mut W,
    framing: Framing,
    response: &JsonRpcResponse,
) -> Result<(), McpServerError>
where
    W: AsyncWrite + Unpin,
{
    let payload = serde_json::to_vec(response)
        .map_err(|err| McpServerError::Transport(format!("failed to encode response: {err}")))?;
    let io_error = |err: std::io::Error| McpServerError::Transport(format!("write failed: {err}"));
    match framing {
        Framing::Line => {
            writer.write_all(&payload).await.map_err(io_error)?;
            writer.write_all(b"\n").await.map_err(io_error)?;
        }
        Framing::ContentLength => {
            let header = format!("Content-Length: {}\r\n\r\n", payload.len());
            writer.write_all(header.as_bytes()).await.map_err(io_error)?;
            writer.write_all(&payload).await.map_err(io_error)?;
        }
    }
    writer.flush().await.map_err(io_error)
}

// ============================================================================
// SECTION: SSE Transport
// ============================================================================

/// Message queued for an SSE session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SessionMessage {
    /// Announces the session's POST endpoint.
    Endpoint(String),
    /// Carries one serialized JSON-RPC reply.
    Message(String),
}

impl SessionMessage {
    /// Converts the message into an SSE event.
    fn into_event(self) -> Event {
        match self {
            Self::Endpoint(uri) => Event::default().event("endpoint").data(uri),
            Self::Message(payload) => Event::default().event("message").data(payload),
        }
    }
}

/// Shared state of the SSE transport.
#[derive(Clone)]
pub(crate) struct SseState {
    /// Request handling state.
    server: Arc<ServerState>,
    /// Open sessions keyed by session id.
    sessions: Arc<Mutex<HashMap<String, mpsc::Sender<SessionMessage>>>>,
}

impl SseState {
    /// Creates transport state with no sessions.
    pub(crate) fn new(server: Arc<ServerState>) -> Self {
        Self {
            server,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Registers a session and queues its endpoint announcement.
    pub(crate) fn open_session(&self) -> (String, mpsc::Receiver<SessionMessage>) {
        let session_id = format!("{:032x}", rand::random::<u128>());
        let (sender, receiver) = mpsc::channel(SESSION_CHANNEL_CAPACITY);
        let endpoint = format!("{MESSAGES_PATH}?session_id={session_id}");
        let _ = sender.try_send(SessionMessage::Endpoint(endpoint));
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session_id.clone(), sender);
        (session_id, receiver)
    }

    /// Returns the sender of an open session.
    fn session(&self, session_id: &str) -> Option<mpsc::Sender<SessionMessage>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner).get(session_id).cloned()
    }

    /// Forgets a session whose stream has gone away.
    fn close_session(&self, session_id: &str) {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner).remove(session_id);
    }
}

/// Query string of `POST /messages/`.
#[derive(Debug, Deserialize)]
pub(crate) struct SessionParams {
    /// Session id announced on the event stream.
    pub(crate) session_id: String,
}

/// Builds the SSE transport routes.
pub(crate) fn sse_router(state: SseState) -> Router {
    let max_body_bytes = state.server.max_body_bytes;
    Router::new()
        .route(SSE_PATH, get(handle_sse))
        .route(MESSAGES_PATH, post(handle_post))
        .route(MESSAGES_PATH_BARE, post(handle_post))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// Binds and serves the SSE transport.
async fn serve_sse(server: Arc<ServerState>, host: &str, port: u16) -> Result<(), McpServerError> {
    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .map_err(|err| McpServerError::Transport(format!("bind {host}:{port} failed: {err}")))?;
    axum::serve(listener, sse_router(SseState::new(server)))
        .await
        .map_err(|err| McpServerError::Transport(format!("sse server failed: {err}")))
}

/// Event stream of one SSE session.
///
/// Dropping the stream, as axum does when the client disconnects, removes
/// the session from the registry.
pub(crate) struct SessionStream {
    /// Messages queued for this session.
    inner: ReceiverStream<SessionMessage>,
    /// Registry the session belongs to.
    state: SseState,
    /// Id of the session.
    session_id: String,
}

impl Stream for SessionStream {
    type Item = Result<Event, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner)
            .poll_next(cx)
            .map(|message| message.map(|message| Ok(message.into_event())))
    }
}

impl Drop for SessionStream {
    fn drop(&mut self) {
        self.state.close_session(&self.session_id);
    }
}

/// Opens an event stream for a new session.
pub(crate) async fn handle_sse(State(state): State<SseState>) -> Sse<KeepAliveStream<SessionStream>> {
    let (session_id, receiver) = state.open_session();
    let stream = SessionStream {
        inner: ReceiverStream::new(receiver),
        state,
        session_id,
    };
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Accepts one client message and queues the reply on the session stream.
///
/// A full session queue is answered with 503 without waiting for room.
pub(crate) async fn handle_post(
    State(state): State<SseState>,
    Query(params): Query<SessionParams>,
    body: Bytes,
) -> Response {
    if body.len() > state.server.max_body_bytes {
        return (StatusCode::PAYLOAD_TOO_LARGE, "message too large").into_response();
    }
    let Some(sender) = state.session(&params.session_id) else {
        return (StatusCode::NOT_FOUND, "could not find session").into_response();
    };
    let request = match decode_request(&body) {
        Ok(request) => request,
        Err(error) => {
            state.server.record(McpMethod::Invalid, None, Some(error.code), body.len());
            return (StatusCode::BAD_REQUEST, error.message).into_response();
        }
    };
    if let Some(response) = handle_request(&state.server, request, body.len()) {
        let payload = match serde_json::to_string(&response) {
            Ok(payload) => payload,
            Err(err) => return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
        };
        match sender.try_send(SessionMessage::Message(payload)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                return (StatusCode::SERVICE_UNAVAILABLE, "session queue full").into_response();
            }
            Err(TrySendError::Closed(_)) => {
                state.close_session(&params.session_id);
                return (StatusCode::NOT_FOUND, "session closed").into_response();
            }
        }
    }
    (StatusCode::ACCEPTED, "Accepted").into_response()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// MCP server errors.
#[derive(Debug, Error)]
pub enum McpServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
