//! HTTP surface for the gateway.
//!
//! Routes: `GET /` answers a service descriptor, `POST /mcp` speaks
//! JSON-RPC 2.0, everything else is 404.

pub mod rpc;

pub use rpc::{JsonRpcRequest, JsonRpcResponse};

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::tools::ToolRegistry;

/// Path of the JSON-RPC tool endpoint.
pub const MCP_ENDPOINT: &str = "/mcp";

/// Identity block served at `GET /`.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceDescriptor {
    pub name: String,
    pub version: String,
    pub description: String,
    /// Identifier of the search index this instance fronts.
    pub backend: String,
    /// Where the JSON-RPC endpoint lives.
    pub endpoint: String,
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ToolRegistry>,
    pub descriptor: Arc<ServiceDescriptor>,
}

impl AppState {
    pub fn new(config: &GatewayConfig, registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            descriptor: Arc::new(ServiceDescriptor {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: crate::VERSION.to_string(),
                description: env!("CARGO_PKG_DESCRIPTION").to_string(),
                backend: config.backend.index_id.clone(),
                endpoint: MCP_ENDPOINT.to_string(),
            }),
        }
    }
}

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route(MCP_ENDPOINT, post(handle_rpc))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn service_info(State(state): State<AppState>) -> Json<ServiceDescriptor> {
    Json(state.descriptor.as_ref().clone())
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({"error": "not found"})))
}

/// Decode the body in two steps so malformed JSON and a malformed request
/// envelope get their distinct JSON-RPC error codes. Notifications are
/// acknowledged with `202 Accepted` and an empty body.
async fn handle_rpc(State(state): State<AppState>, body: String) -> Response {
    let value: Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(e) => {
            let response =
                JsonRpcResponse::error(Value::Null, rpc::PARSE_ERROR, format!("parse error: {}", e));
            return Json(response).into_response();
        }
    };

    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) => {
            let response = JsonRpcResponse::error(
                Value::Null,
                rpc::INVALID_REQUEST,
                format!("invalid request: {}", e),
            );
            return Json(response).into_response();
        }
    };

    match rpc::dispatch(&state.registry, &state.descriptor, request).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
