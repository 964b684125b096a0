use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::{json, Value};

use agentdeck_core::types::{CreateTaskRequest, TaskModification};

use crate::AppState;

// ── Error helpers ─────────────────────────────────────────────────────────

pub(crate) type ApiError = (StatusCode, Json<Value>);

/// Any upstream failure (transport or non-2xx) is normalized to a generic
/// 500 carrying the caught message. No retry.
fn upstream_error(e: impl std::fmt::Display) -> ApiError {
    tracing::error!("upstream error: {e}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
    )
}

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": message.into() })),
    )
}

/// Proxy responses are never cacheable (the front end re-polls constantly).
fn no_store(value: Value) -> Response {
    ([(header::CACHE_CONTROL, "no-store")], Json(value)).into_response()
}

// ── Request body types ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(crate) struct CreateTaskBody {
    pub agent_name: String,
    pub agent_version: String,
    pub prompt: String,
    pub require_approval: Option<bool>,
}

#[derive(Deserialize)]
pub(crate) struct ModifyTaskBody {
    pub task_id: String,
    pub modification_type: String,
    pub prompt: Option<String>,
}

// ── Handlers ──────────────────────────────────────────────────────────────

pub(crate) async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// Tasks

pub(crate) async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTaskBody>,
) -> Result<Response, ApiError> {
    let req = CreateTaskRequest {
        agent_name: body.agent_name,
        agent_version: body.agent_version,
        prompt: body.prompt,
        require_approval: body.require_approval.unwrap_or(false),
    };
    let task: Value = state.client.create_task(&req).await.map_err(upstream_error)?;
    Ok(no_store(task))
}

pub(crate) async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Response, ApiError> {
    if task_id.is_empty() {
        return Err(bad_request("Task ID is required"));
    }
    let task: Value = state.client.get_task(&task_id).await.map_err(upstream_error)?;
    Ok(no_store(task))
}

pub(crate) async fn get_task_missing_id() -> ApiError {
    bad_request("Task ID is required")
}

pub(crate) async fn list_tasks(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let tasks: Value = state.client.list_tasks().await.map_err(upstream_error)?;
    Ok(no_store(tasks))
}

pub(crate) async fn modify_task(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ModifyTaskBody>,
) -> Result<Response, ApiError> {
    // Unsupported types are rejected here, before any upstream contact.
    let Some(modification) = TaskModification::from_parts(&body.modification_type, body.prompt)
    else {
        return Err(bad_request(format!(
            "Invalid modification type: {}",
            body.modification_type
        )));
    };
    let updated: Value = state
        .client
        .modify_task(&body.task_id, &modification)
        .await
        .map_err(upstream_error)?;
    Ok(no_store(updated))
}

// Agents

pub(crate) async fn list_agents(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let agents: Value = state.client.list_agents().await.map_err(upstream_error)?;
    Ok(no_store(agents))
}

pub(crate) async fn get_agent(
    State(state): State<Arc<AppState>>,
    Path(agent_id): Path<String>,
) -> Result<Response, ApiError> {
    if agent_id.is_empty() {
        return Err(bad_request("agent ID is required"));
    }
    let agent: Value = state.client.get_agent(&agent_id).await.map_err(upstream_error)?;
    Ok(no_store(agent))
}

pub(crate) async fn get_agent_missing_id() -> ApiError {
    bad_request("agent ID is required")
}
