use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ── Task Status ──────────────────────────────────────────────────────────

/// Lifecycle status of a task, owned and advanced by the backend.
/// The client only observes it; transitions are monotonic toward one of
/// the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    #[serde(alias = "pending")]
    Pending,
    #[serde(alias = "running")]
    Running,
    #[serde(alias = "completed")]
    Completed,
    #[serde(alias = "failed")]
    Failed,
    #[serde(alias = "canceled")]
    Canceled,
}

impl TaskStatus {
    /// True once the backend will never mutate the task again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Canceled)
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Pending
    }
}

// ── Messages ─────────────────────────────────────────────────────────────

/// A single tool invocation recorded on an assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

/// A message in a task thread, dispatched on `role`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    User {
        content: String,
    },
    Assistant {
        #[serde(default)]
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,
        /// Named artifacts produced by the agent, name → textual content.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        artifacts: Option<BTreeMap<String, String>>,
    },
}

impl Message {
    pub fn content(&self) -> &str {
        match self {
            Self::User { content } | Self::Assistant { content, .. } => content,
        }
    }
}

// ── Task ─────────────────────────────────────────────────────────────────

/// A task as returned by the backend. The client holds a transient,
/// repeatedly-refreshed copy; the authoritative record lives upstream.
///
/// `PartialEq` is the poller's change detector: two fetches compare equal
/// iff the backend state is structurally unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub agent_id: String,
    /// Thread name → ordered message sequence.
    #[serde(default)]
    pub threads: BTreeMap<String, Vec<Message>>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
}

impl Task {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// All messages across threads, in thread order.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.threads.values().flatten()
    }
}

// ── Agent ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
}

// ── Requests ─────────────────────────────────────────────────────────────

/// Body for `POST /tasks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub agent_name: String,
    pub agent_version: String,
    pub prompt: String,
    pub require_approval: bool,
}

/// Body for `POST /tasks/{id}/modify`, serialized as
/// `{"type":"instruct","prompt":...}` / `{"type":"approve"}` / `{"type":"cancel"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TaskModification {
    Instruct { prompt: String },
    Approve,
    Cancel,
}

impl TaskModification {
    /// Parse the front-end's `modification_type` string. Unknown types are
    /// rejected here, before any upstream call is made.
    pub fn from_parts(modification_type: &str, prompt: Option<String>) -> Option<Self> {
        match modification_type {
            "instruct" => Some(Self::Instruct {
                prompt: prompt.unwrap_or_default(),
            }),
            "approve" => Some(Self::Approve),
            "cancel" => Some(Self::Cancel),
            _ => None,
        }
    }
}
