use axum::{
    extract::Path,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};

use agentdeck_core::client::AgentexClient;
use agentdeck_core::types::{Agent, CreateTaskRequest, Message, Task, TaskModification, TaskStatus};

async fn spawn_upstream() -> String {
    async fn create(Json(body): Json<Value>) -> Json<Value> {
        Json(json!({
            "id": "task-1",
            "agent_id": "agent-1",
            "threads": { "main": [{ "role": "user", "content": body["prompt"] }] },
            "status": "PENDING",
        }))
    }

    async fn fetch(Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
        if id == "missing" {
            return Err(StatusCode::NOT_FOUND);
        }
        Ok(Json(json!({
            "id": id,
            "agent_id": "agent-1",
            "threads": {
                "main": [
                    { "role": "user", "content": "hi" },
                    { "role": "assistant", "content": "", "tool_calls": [
                        { "id": "t1", "name": "search", "arguments": { "q": "rust" } },
                    ]},
                ],
            },
            // Lowercase on the wire must still parse.
            "status": "running",
        })))
    }

    async fn modify(Path(id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
        let status = if body["type"] == "cancel" { "CANCELED" } else { "RUNNING" };
        Json(json!({
            "id": id,
            "agent_id": "agent-1",
            "threads": {},
            "status": status,
        }))
    }

    async fn agents() -> Json<Value> {
        Json(json!([
            { "id": "agent-1", "name": "hello-world", "version": "0.0.10" },
        ]))
    }

    let app = Router::new()
        .route("/tasks", post(create))
        .route("/tasks/:id", get(fetch))
        .route("/tasks/:id/modify", post(modify))
        .route("/agents", get(agents));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn create_task_returns_typed_task() {
    let base = spawn_upstream().await;
    let client = AgentexClient::new(base);
    let task: Task = client
        .create_task(&CreateTaskRequest {
            agent_name: "hello-world".into(),
            agent_version: "0.0.10".into(),
            prompt: "hi".into(),
            require_approval: false,
        })
        .await
        .unwrap();
    assert_eq!(task.id, "task-1");
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.messages().count(), 1);
}

#[tokio::test]
async fn get_task_parses_threads_and_lowercase_status() {
    let base = spawn_upstream().await;
    let client = AgentexClient::new(base);
    let task: Task = client.get_task("task-42").await.unwrap();
    assert_eq!(task.id, "task-42");
    assert_eq!(task.status, TaskStatus::Running);
    let messages: Vec<&Message> = task.messages().collect();
    assert_eq!(messages.len(), 2);
    match messages[1] {
        Message::Assistant { tool_calls: Some(calls), .. } => {
            assert_eq!(calls[0].name, "search");
        }
        other => panic!("expected assistant with tool calls, got {other:?}"),
    }
}

#[tokio::test]
async fn get_task_non_success_yields_canonical_message() {
    let base = spawn_upstream().await;
    let client = AgentexClient::new(base);
    let err = client.get_task::<Task>("missing").await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to fetch task with ID missing");
}

#[tokio::test]
async fn modify_task_cancel_round_trip() {
    let base = spawn_upstream().await;
    let client = AgentexClient::new(base);
    let task: Task = client
        .modify_task("task-42", &TaskModification::Cancel)
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::Canceled);
    assert!(task.is_terminal());
}

#[tokio::test]
async fn list_agents_parses_sparse_records() {
    let base = spawn_upstream().await;
    let client = AgentexClient::new(base);
    let agents: Vec<Agent> = client.list_agents().await.unwrap();
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].name, "hello-world");
    // Fields the upstream omitted default to empty.
    assert!(agents[0].description.is_empty());
}
