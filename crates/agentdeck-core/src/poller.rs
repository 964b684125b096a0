use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::client::TaskSource;
use crate::types::{Task, TaskModification};

/// Point-in-time view of a watched task.
#[derive(Debug, Clone, Default)]
pub struct TaskSnapshot {
    pub task: Option<Task>,
    /// Set each time the held task is replaced with a structurally
    /// different one; untouched on no-change polls.
    pub last_updated: Option<DateTime<Utc>>,
    /// Message from the most recent failed fetch; cleared on success.
    pub last_error: Option<String>,
    /// Completed fetch attempts, successful or not.
    pub polls: u64,
}

struct WatchShared {
    state: Mutex<TaskSnapshot>,
    changed_tx: watch::Sender<TaskSnapshot>,
}

impl WatchShared {
    /// Fold one fetch result into the held state. Returns true when the
    /// loop should stop (terminal status observed, or torn down).
    ///
    /// Results arriving after cancellation are discarded: the consumer is
    /// gone and must not see a stale update.
    fn apply(&self, cancel: &CancellationToken, fetched: Result<Task>) -> bool {
        if cancel.is_cancelled() {
            return true;
        }
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.polls += 1;
        match fetched {
            Ok(task) => {
                state.last_error = None;
                let terminal = task.is_terminal();
                if state.task.as_ref() != Some(&task) {
                    state.task = Some(task);
                    state.last_updated = Some(Utc::now());
                    let _ = self.changed_tx.send(state.clone());
                }
                terminal
            }
            Err(e) => {
                // Transient failures keep the previous view and keep polling.
                tracing::warn!("task fetch failed: {e:#}");
                state.last_error = Some(e.to_string());
                false
            }
        }
    }

    fn record_error(&self, message: String) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.last_error = Some(message);
    }
}

/// Keeps a local view of one task fresh by polling on a fixed interval,
/// replacing the held state only when the fetched task differs
/// structurally from the previous one.
///
/// The polling loop is a single spawned task that awaits each fetch to
/// completion, so fetches never overlap; a round trip slower than the
/// interval delays the next tick instead of stacking requests. The loop
/// exits on its own once a terminal status is observed, and
/// [`stop_watching`](Self::stop_watching) or dropping the watcher halts it
/// deterministically.
pub struct TaskWatcher {
    task_id: String,
    source: Arc<dyn TaskSource>,
    shared: Arc<WatchShared>,
    cancel: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl TaskWatcher {
    /// Fetch the task once immediately, then refetch on `interval`.
    ///
    /// `Config::poll_interval()` yields the clamped 1–3 s production value;
    /// tests may pass anything.
    pub fn start_watching(
        source: Arc<dyn TaskSource>,
        task_id: impl Into<String>,
        interval: Duration,
    ) -> Self {
        let task_id = task_id.into();
        let (changed_tx, _) = watch::channel(TaskSnapshot::default());
        let shared = Arc::new(WatchShared {
            state: Mutex::new(TaskSnapshot::default()),
            changed_tx,
        });
        let cancel = CancellationToken::new();

        let handle = {
            let source = Arc::clone(&source);
            let shared = Arc::clone(&shared);
            let cancel = cancel.clone();
            let task_id = task_id.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    // First tick completes immediately.
                    tokio::select! {
                        () = cancel.cancelled() => break,
                        _ = ticker.tick() => {}
                    }
                    let fetched = source.fetch_task(&task_id).await;
                    if shared.apply(&cancel, fetched) {
                        break;
                    }
                }
                tracing::debug!("watcher for task {task_id} stopped");
            })
        };

        Self {
            task_id,
            source,
            shared,
            cancel,
            handle: Mutex::new(Some(handle)),
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Halt further fetches. An in-flight request is not aborted; its
    /// result is discarded. Idempotent.
    pub fn stop_watching(&self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.lock().unwrap_or_else(|e| e.into_inner()).take() {
            drop(handle);
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Current view state.
    pub fn snapshot(&self) -> TaskSnapshot {
        self.shared
            .state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Receiver notified only on genuine task changes.
    pub fn subscribe(&self) -> watch::Receiver<TaskSnapshot> {
        self.shared.changed_tx.subscribe()
    }

    /// One immediate fetch outside the polling cadence, used after a
    /// successful mutation so the view reflects it without waiting a tick.
    pub async fn refresh_now(&self) {
        let fetched = self.source.fetch_task(&self.task_id).await;
        self.shared.apply(&self.cancel, fetched);
    }

    pub async fn instruct(&self, prompt: impl Into<String>) -> Result<Task> {
        self.modify(TaskModification::Instruct {
            prompt: prompt.into(),
        })
        .await
    }

    pub async fn approve(&self) -> Result<Task> {
        self.modify(TaskModification::Approve).await
    }

    pub async fn cancel_task(&self) -> Result<Task> {
        self.modify(TaskModification::Cancel).await
    }

    /// Send a modification upstream, then refresh immediately.
    /// Rejected locally, with no network call, once the task is terminal.
    async fn modify(&self, modification: TaskModification) -> Result<Task> {
        {
            let state = self.shared.state.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(task) = &state.task {
                if task.is_terminal() {
                    bail!(
                        "task {} is {:?}; no further modifications accepted",
                        self.task_id,
                        task.status
                    );
                }
            }
        }
        let updated = match self.source.modify_task(&self.task_id, &modification).await {
            Ok(task) => task,
            Err(e) => {
                self.shared.record_error(e.to_string());
                return Err(e);
            }
        };
        self.refresh_now().await;
        Ok(updated)
    }
}

impl Drop for TaskWatcher {
    fn drop(&mut self) {
        // Teardown must release the recurring timer even when the consumer
        // forgets to call stop_watching.
        self.cancel.cancel();
    }
}
