//! JSON-RPC 2.0 messages and method dispatch for the tool endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::server::ServiceDescriptor;
use crate::tools::{ToolRegistry, ToolResult};

pub const JSONRPC_VERSION: &str = "2.0";
pub const PROTOCOL_VERSION: &str = "2025-03-26";

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

/// One decoded request. A missing `id` marks a notification.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// `tools/call` result payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub content: Vec<ToolContent>,
    pub is_error: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    Text { text: String },
}

impl From<ToolResult> for ToolCallResult {
    fn from(result: ToolResult) -> Self {
        Self {
            is_error: result.is_error(),
            content: vec![ToolContent::Text {
                text: result.text().to_string(),
            }],
        }
    }
}

/// Route one request to its method handler. Notifications are accepted
/// and produce no response.
pub async fn dispatch(
    registry: &ToolRegistry,
    descriptor: &ServiceDescriptor,
    request: JsonRpcRequest,
) -> Option<JsonRpcResponse> {
    if request.jsonrpc != JSONRPC_VERSION {
        return Some(JsonRpcResponse::error(
            request.id.unwrap_or(Value::Null),
            INVALID_REQUEST,
            format!("unsupported JSON-RPC version: {:?}", request.jsonrpc),
        ));
    }

    let Some(id) = request.id else {
        debug!(method = %request.method, "notification received");
        return None;
    };

    let response = match request.method.as_str() {
        "initialize" => JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {"tools": {}},
                "serverInfo": {
                    "name": descriptor.name,
                    "version": descriptor.version,
                },
            }),
        ),
        "ping" => JsonRpcResponse::success(id, json!({})),
        "tools/list" => JsonRpcResponse::success(id, json!({"tools": registry.definitions()})),
        "tools/call" => handle_tool_call(registry, id, request.params).await,
        other => JsonRpcResponse::error(
            id,
            METHOD_NOT_FOUND,
            format!("method not found: {}", other),
        ),
    };
    Some(response)
}

async fn handle_tool_call(registry: &ToolRegistry, id: Value, params: Value) -> JsonRpcResponse {
    let Some(name) = params.get("name").and_then(Value::as_str) else {
        return JsonRpcResponse::error(
            id,
            INVALID_PARAMS,
            "tools/call requires a string `name` parameter",
        );
    };
    if !registry.contains(name) {
        return JsonRpcResponse::error(id, INVALID_PARAMS, format!("unknown tool: {}", name));
    }
    let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

    debug!(tool = name, "executing tool call");
    let result = registry.execute(name, arguments).await;
    match serde_json::to_value(ToolCallResult::from(result)) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
    }
}
