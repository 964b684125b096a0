use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use agentdeck_core::client::AgentexClient;

mod routes;

pub struct AppState {
    pub client: AgentexClient,
}

/// The `/api` proxy surface. Static dashboard serving is layered on in
/// `main`; tests drive this router directly.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .route("/api/health", get(routes::health))
        // Tasks
        .route("/api/create-task", post(routes::create_task))
        .route("/api/get-task/:task_id", get(routes::get_task))
        .route("/api/get-task", get(routes::get_task_missing_id))
        .route("/api/list-tasks", get(routes::list_tasks))
        .route("/api/modify-task", post(routes::modify_task))
        // Agents
        .route("/api/list-agents", get(routes::list_agents))
        .route("/api/get-agent/:agent_id", get(routes::get_agent))
        .route("/api/get-agent", get(routes::get_agent_missing_id))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
