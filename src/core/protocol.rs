/// Wire Protocol
///
/// Requests arrive as JSON documents in one of two shapes:
///
/// - JSON-RPC 2.0 / MCP: `{"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {...}}`
/// - direct call: `{"tool": "name", "args": {...}, "id": optional}`
///
/// Both are dispatched onto `ToolServer::invoke`. Every failure short of a
/// broken channel is answered with a structured error response.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::core::error::ToolServerError;
use crate::core::server::ToolServer;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

/// JSON-RPC 2.0 request structure for MCP protocol.
///
/// The `id` is read from the raw message instead: a request whose `id` key is
/// absent is a notification, while `"id": null` still gets a response.
#[derive(Deserialize, Debug)]
pub struct RpcRequest {
    #[allow(dead_code)]
    jsonrpc: Option<String>,
    method: String,
    params: Option<Value>,
}

/// JSON-RPC 2.0 response structure.
///
/// Exactly one of `result` and `error` is present.
#[derive(Serialize, Debug)]
pub struct RpcResponse {
    jsonrpc: &'static str,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

impl RpcResponse {
    fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC 2.0 error structure.
#[derive(Serialize, Debug)]
pub struct RpcError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl RpcError {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

impl From<&ToolServerError> for RpcError {
    fn from(err: &ToolServerError) -> Self {
        match err {
            ToolServerError::ToolNotFound(_) => RpcError::new(METHOD_NOT_FOUND, err.to_string()),
            ToolServerError::InvalidArguments { .. } => RpcError {
                code: INVALID_PARAMS,
                message: err.to_string(),
                data: Some(json!({ "parameters": err.offending_parameters() })),
            },
            _ => RpcError::new(INTERNAL_ERROR, err.to_string()),
        }
    }
}

#[derive(Deserialize, Debug)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

#[derive(Deserialize, Debug)]
struct DirectCall {
    tool: String,
    #[serde(default)]
    args: Option<Value>,
}

/// Handle one newline-delimited message.
///
/// Returns the serialized response line, or None when the message was a
/// notification.
pub fn handle_line(server: &ToolServer, line: &str) -> Option<String> {
    let response = match serde_json::from_str::<Value>(line) {
        Ok(message) => handle_message(server, message)?,
        Err(e) => parse_error(server, e),
    };
    Some(response.to_string())
}

/// Handle one raw line as read off the wire.
///
/// A line that is not valid UTF-8 is answered with a parse error like any
/// other malformed message.
pub fn handle_bytes(server: &ToolServer, line: &[u8]) -> Option<String> {
    match std::str::from_utf8(line) {
        Ok(line) => handle_line(server, line),
        Err(e) => Some(parse_error(server, e).to_string()),
    }
}

fn parse_error(server: &ToolServer, e: impl std::fmt::Display) -> Value {
    server.logger().warn(format!("Parse error: {}", e));
    to_value(RpcResponse::failure(
        Value::Null,
        RpcError::new(PARSE_ERROR, format!("Parse error: {}", e)),
    ))
}

/// Handle one decoded message, returning the response document if any.
pub fn handle_message(server: &ToolServer, message: Value) -> Option<Value> {
    if message.get("method").is_some() {
        let id = message.get("id").cloned();
        return match serde_json::from_value::<RpcRequest>(message) {
            Ok(request) => handle_rpc(server, id, request).map(to_value),
            Err(e) => Some(to_value(RpcResponse::failure(
                id.unwrap_or(Value::Null),
                RpcError::new(INVALID_REQUEST, format!("Invalid request: {}", e)),
            ))),
        };
    }

    if message.get("tool").is_some() {
        let id = message.get("id").cloned();
        return Some(match serde_json::from_value::<DirectCall>(message) {
            Ok(call) => handle_direct(server, id, call),
            Err(e) => direct_response(
                id,
                Err(json!({ "kind": "invalid_request", "message": e.to_string() })),
            ),
        });
    }

    let id = message.get("id").cloned().unwrap_or(Value::Null);
    Some(to_value(RpcResponse::failure(
        id,
        RpcError::new(INVALID_REQUEST, "Invalid request: expected 'method' or 'tool'"),
    )))
}

fn handle_rpc(server: &ToolServer, id: Option<Value>, request: RpcRequest) -> Option<RpcResponse> {
    let Some(id) = id else {
        server
            .logger()
            .debug(format!("Notification received: {}", request.method));
        return None;
    };

    let result = match request.method.as_str() {
        "initialize" => Ok(handle_initialize(server)),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({ "tools": server.tool_definitions() })),
        "tools/call" => handle_tools_call(server, request.params),
        _ => Err(RpcError::new(
            METHOD_NOT_FOUND,
            format!("Method not found: {}", request.method),
        )),
    };

    Some(match result {
        Ok(result) => RpcResponse::success(id, result),
        Err(error) => RpcResponse::failure(id, error),
    })
}

fn handle_initialize(server: &ToolServer) -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": server.name(),
            "version": env!("CARGO_PKG_VERSION")
        },
        "_meta": {
            "originCitation": server.origin_citation(),
            "mcpCitation": server.mcp_citation()
        }
    })
}

/// Handle MCP tools/call.
///
/// Execution failures are reported inside the result with `isError: true`;
/// lookup and validation failures are JSON-RPC errors.
fn handle_tools_call(server: &ToolServer, params: Option<Value>) -> Result<Value, RpcError> {
    let params: CallToolParams = params
        .ok_or_else(|| RpcError::new(INVALID_PARAMS, "Invalid params"))
        .and_then(|p| {
            serde_json::from_value(p)
                .map_err(|e| RpcError::new(INVALID_PARAMS, format!("Invalid params: {}", e)))
        })?;
    let arguments = arguments_map(params.arguments)
        .map_err(|message| RpcError::new(INVALID_PARAMS, message))?;

    match server.invoke(&params.name, arguments) {
        Ok(value) => Ok(tool_result(value)),
        Err(ToolServerError::ToolExecution { message, .. }) => Ok(json!({
            "content": [
                {
                    "type": "text",
                    "text": format!("Error: {}", message)
                }
            ],
            "isError": true
        })),
        Err(err) => {
            server.logger().warn(&err);
            Err(RpcError::from(&err))
        }
    }
}

fn tool_result(value: Value) -> Value {
    let text = match &value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let mut result = json!({
        "content": [
            {
                "type": "text",
                "text": text
            }
        ],
        "isError": false
    });
    if value.is_object() {
        result["structuredContent"] = value;
    }
    result
}

fn handle_direct(server: &ToolServer, id: Option<Value>, call: DirectCall) -> Value {
    let arguments = match arguments_map(call.args) {
        Ok(arguments) => arguments,
        Err(message) => {
            return direct_response(
                id,
                Err(json!({ "kind": "invalid_request", "message": message })),
            );
        }
    };

    let outcome = server.invoke(&call.tool, arguments).map_err(|err| {
        if !matches!(err, ToolServerError::ToolExecution { .. }) {
            server.logger().warn(&err);
        }
        let mut error = json!({ "kind": err.kind(), "message": err.to_string() });
        if matches!(err, ToolServerError::InvalidArguments { .. }) {
            error["parameters"] = json!(err.offending_parameters());
        }
        error
    });
    direct_response(id, outcome)
}

fn direct_response(id: Option<Value>, outcome: Result<Value, Value>) -> Value {
    let mut response = Map::new();
    if let Some(id) = id {
        response.insert("id".to_string(), id);
    }
    match outcome {
        Ok(result) => response.insert("result".to_string(), result),
        Err(error) => response.insert("error".to_string(), error),
    };
    Value::Object(response)
}

fn arguments_map(arguments: Option<Value>) -> Result<Map<String, Value>, String> {
    match arguments {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err("arguments must be a JSON object".to_string()),
    }
}

fn to_value(response: RpcResponse) -> Value {
    serde_json::to_value(response).unwrap_or_else(|e| {
        json!({
            "jsonrpc": "2.0",
            "id": null,
            "error": { "code": INTERNAL_ERROR, "message": format!("Failed to serialize response: {}", e) }
        })
    })
}
