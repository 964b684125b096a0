use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::types::{CreateTaskRequest, Task, TaskModification};

/// HTTP client for the external agent task service.
///
/// Methods are generic over the deserialization target: the gateway forwards
/// `serde_json::Value` unchanged, while the poller asks for typed [`Task`]s.
/// Non-2xx upstream responses fail with the canonical user-facing messages
/// that the gateway surfaces verbatim.
pub struct AgentexClient {
    base_url: String,
    client: Client,
}

impl AgentexClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
        }
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: std::time::Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn create_task<T: DeserializeOwned>(&self, req: &CreateTaskRequest) -> Result<T> {
        let resp = self
            .client
            .post(self.url("/tasks"))
            .json(req)
            .send()
            .await
            .context("create task request")?;
        if !resp.status().is_success() {
            bail!("Failed to create task");
        }
        resp.json().await.context("create task parse")
    }

    pub async fn get_task<T: DeserializeOwned>(&self, task_id: &str) -> Result<T> {
        let resp = self
            .client
            .get(self.url(&format!("/tasks/{task_id}")))
            .send()
            .await
            .context("get task request")?;
        if !resp.status().is_success() {
            bail!("Failed to fetch task with ID {task_id}");
        }
        resp.json().await.context("get task parse")
    }

    pub async fn list_tasks<T: DeserializeOwned>(&self) -> Result<T> {
        let resp = self
            .client
            .get(self.url("/tasks"))
            .send()
            .await
            .context("list tasks request")?;
        if !resp.status().is_success() {
            bail!("Failed to fetch tasks");
        }
        resp.json().await.context("list tasks parse")
    }

    pub async fn modify_task<T: DeserializeOwned>(
        &self,
        task_id: &str,
        modification: &TaskModification,
    ) -> Result<T> {
        let resp = self
            .client
            .post(self.url(&format!("/tasks/{task_id}/modify")))
            .json(modification)
            .send()
            .await
            .context("modify task request")?;
        if !resp.status().is_success() {
            bail!("Failed to modify task");
        }
        resp.json().await.context("modify task parse")
    }

    pub async fn list_agents<T: DeserializeOwned>(&self) -> Result<T> {
        let resp = self
            .client
            .get(self.url("/agents"))
            .send()
            .await
            .context("list agents request")?;
        if !resp.status().is_success() {
            bail!("Failed to fetch agents");
        }
        resp.json().await.context("list agents parse")
    }

    pub async fn get_agent<T: DeserializeOwned>(&self, agent_id: &str) -> Result<T> {
        let resp = self
            .client
            .get(self.url(&format!("/agents/{agent_id}")))
            .send()
            .await
            .context("get agent request")?;
        if !resp.status().is_success() {
            bail!("Failed to fetch agent with ID {agent_id}");
        }
        resp.json().await.context("get agent parse")
    }
}

/// The slice of the upstream contract the task watcher needs.
/// Trait seam so tests can substitute an in-memory fake for HTTP.
#[async_trait]
pub trait TaskSource: Send + Sync {
    async fn fetch_task(&self, task_id: &str) -> Result<Task>;

    async fn list_tasks(&self) -> Result<Vec<Task>>;

    async fn modify_task(&self, task_id: &str, modification: &TaskModification) -> Result<Task>;
}

#[async_trait]
impl TaskSource for AgentexClient {
    async fn fetch_task(&self, task_id: &str) -> Result<Task> {
        self.get_task(task_id).await
    }

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        AgentexClient::list_tasks(self).await
    }

    async fn modify_task(&self, task_id: &str, modification: &TaskModification) -> Result<Task> {
        AgentexClient::modify_task(self, task_id, modification).await
    }
}
