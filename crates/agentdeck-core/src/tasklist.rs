use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};

use crate::client::TaskSource;
use crate::types::Task;

/// Holds the task collection for sidebar display.
///
/// Injected from the composition root; no ambient singleton. A refresh
/// always replaces the entire held collection with the result of the most
/// recent successful list fetch, newest first. No incremental diffing.
pub struct TaskListStore {
    source: Arc<dyn TaskSource>,
    tasks: RwLock<Vec<Task>>,
}

impl TaskListStore {
    pub fn new(source: Arc<dyn TaskSource>) -> Self {
        Self {
            source,
            tasks: RwLock::new(Vec::new()),
        }
    }

    /// Fetch the full list and replace the held collection wholesale.
    /// On failure the held collection is left untouched.
    pub async fn refresh(&self) -> Result<()> {
        let mut tasks = self.source.list_tasks().await.context("refresh task list")?;
        // Upstream returns oldest first; the sidebar wants newest on top.
        tasks.reverse();
        *self.tasks.write().unwrap_or_else(|e| e.into_inner()) = tasks;
        Ok(())
    }

    /// Snapshot of the most recent successful fetch.
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_empty()
    }
}
