//! In-memory task manager.
//!
//! `TaskQueue` keeps bookkeeping and state transitions only; it never runs
//! work itself. An executor submits tasks, takes their cancellation token
//! with [`TaskQueue::start`] and reports back through the `report_*` /
//! terminal methods. The facade drives it through [`TaskManager`].

use crate::error::Result;
use crate::types::TaskState;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use super::{TaskLike, TaskManager};

/// A task tracked by [`TaskQueue`]
#[derive(Clone, Debug)]
pub struct BackgroundTask {
    id: String,
    name: String,
    state: TaskState,
    status: String,
    progress: f64,
    error: Option<String>,
    cancel_token: CancellationToken,
}

impl BackgroundTask {
    fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            state: TaskState::Pending,
            status: "pending".to_string(),
            progress: 0.0,
            error: None,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Token fired when cancellation of this task is requested
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    fn is_startable(&self) -> bool {
        matches!(
            self.state,
            TaskState::Pending | TaskState::WaitingRetry | TaskState::BeforeRetry
        )
    }

    fn requeue(&mut self) {
        self.state = TaskState::WaitingRetry;
        self.status = "waiting for retry".to_string();
        self.progress = 0.0;
        self.error = None;
        // The old token may already be cancelled.
        self.cancel_token = CancellationToken::new();
    }
}

impl TaskLike for BackgroundTask {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn state(&self) -> TaskState {
        self.state
    }

    fn status(&self) -> String {
        self.status.clone()
    }

    fn progress(&self) -> f64 {
        self.progress
    }

    fn error(&self) -> Option<String> {
        self.error.clone()
    }
}

/// Insertion-ordered in-memory task manager
#[derive(Debug, Default)]
pub struct TaskQueue {
    tasks: RwLock<Vec<BackgroundTask>>,
    next_id: AtomicU64,
}

impl TaskQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new pending task and return its ID
    pub async fn submit(&self, name: impl Into<String>) -> String {
        let id = (self.next_id.fetch_add(1, Ordering::SeqCst) + 1).to_string();
        let task = BackgroundTask::new(id.clone(), name.into());

        tracing::debug!(task_id = %id, name = %task.name, "Task submitted");
        self.tasks.write().await.push(task);
        id
    }

    /// Number of tracked tasks
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    /// Whether no task is tracked
    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }

    /// Mark a pending or retrying task as running
    ///
    /// Returns the task's cancellation token for the worker, or `None` if the
    /// task does not exist or is not waiting to run.
    pub async fn start(&self, id: &str) -> Option<CancellationToken> {
        self.update(id, |task| {
            if !task.is_startable() {
                return None;
            }
            task.state = TaskState::Running;
            task.status = "running".to_string();
            Some(task.cancel_token.clone())
        })
        .await
        .flatten()
    }

    /// Record progress of a running task
    pub async fn report_progress(&self, id: &str, progress: f64, status: impl Into<String>) {
        let status = status.into();
        self.update(id, |task| {
            task.progress = progress;
            task.status = status;
        })
        .await;
    }

    /// Force a task into `state`
    ///
    /// For executors modelling intermediate states (errored, failing, before
    /// retry) that the convenience methods below do not cover.
    pub async fn set_state(&self, id: &str, state: TaskState) {
        self.update(id, |task| task.state = state).await;
    }

    /// Mark a task as failed with the given error
    pub async fn fail(&self, id: &str, error: impl Into<String>) {
        let error = error.into();
        self.update(id, |task| {
            task.state = TaskState::Failed;
            task.status = "failed".to_string();
            task.error = Some(error);
        })
        .await;
    }

    /// Mark a task as successfully finished
    pub async fn succeed(&self, id: &str) {
        self.update(id, |task| {
            task.state = TaskState::Succeeded;
            task.status = "succeeded".to_string();
            task.progress = 100.0;
        })
        .await;
    }

    /// Acknowledge that a worker stopped after a cancellation request
    pub async fn canceled(&self, id: &str) {
        self.update(id, |task| {
            if task.state == TaskState::Canceling {
                task.state = TaskState::Canceled;
                task.status = "canceled".to_string();
            }
        })
        .await;
    }

    async fn update<R>(&self, id: &str, f: impl FnOnce(&mut BackgroundTask) -> R) -> Option<R> {
        let mut tasks = self.tasks.write().await;
        tasks.iter_mut().find(|t| t.id == id).map(f)
    }
}

#[async_trait]
impl TaskManager for TaskQueue {
    type Task = BackgroundTask;

    async fn get_by_state(&self, states: &[TaskState]) -> Vec<BackgroundTask> {
        let tasks = self.tasks.read().await;
        tasks
            .iter()
            .filter(|t| states.contains(&t.state))
            .cloned()
            .collect()
    }

    async fn get_by_id(&self, id: &str) -> Option<BackgroundTask> {
        let tasks = self.tasks.read().await;
        tasks.iter().find(|t| t.id == id).cloned()
    }

    async fn cancel(&self, id: &str) -> Result<()> {
        self.update(id, |task| match task.state {
            TaskState::Running | TaskState::Failing => {
                // The worker acknowledges through `canceled()`.
                task.state = TaskState::Canceling;
                task.status = "canceling".to_string();
                task.cancel_token.cancel();
            }
            TaskState::Pending
            | TaskState::Errored
            | TaskState::WaitingRetry
            | TaskState::BeforeRetry => {
                task.state = TaskState::Canceled;
                task.status = "canceled".to_string();
                task.cancel_token.cancel();
            }
            TaskState::Canceling
            | TaskState::Canceled
            | TaskState::Failed
            | TaskState::Succeeded => {}
        })
        .await;
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        let mut tasks = self.tasks.write().await;
        if let Some(pos) = tasks.iter().position(|t| t.id == id) {
            let task = tasks.remove(pos);
            // Nobody is left to report to.
            task.cancel_token.cancel();
        }
        Ok(())
    }

    async fn retry(&self, id: &str) -> Result<()> {
        self.update(id, |task| {
            if task.state == TaskState::Failed {
                task.requeue();
            }
        })
        .await;
        Ok(())
    }

    async fn remove_by_state(&self, states: &[TaskState]) -> Result<usize> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| {
            let remove = states.contains(&t.state);
            if remove {
                t.cancel_token.cancel();
            }
            !remove
        });
        Ok(before - tasks.len())
    }

    async fn retry_all_failed(&self) -> Result<usize> {
        let mut tasks = self.tasks.write().await;
        let mut count = 0;
        for task in tasks.iter_mut().filter(|t| t.state == TaskState::Failed) {
            task.requeue();
            count += 1;
        }
        Ok(count)
    }
}
