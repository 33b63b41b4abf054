//! Task projection, querying and control.
//!
//! Task managers own heterogeneous task types. This module reduces them to a
//! single capability, [`TaskLike`], and a single manager contract,
//! [`TaskManager`], so queries and control actions are written once:
//! - [`project`] - one task → one [`TaskRecord`]
//! - [`query_by_states`] / [`get_by_id`] - manager → records
//! - [`facade`] - type-erased control surface per task domain
//! - [`queue`] - in-memory reference manager

use crate::error::{Error, Result};
use crate::types::{TaskRecord, TaskState};
use async_trait::async_trait;
use std::sync::Arc;

pub mod facade;
pub mod queue;

pub use facade::{TaskControl, TaskFacade, TaskRegistry};
pub use queue::{BackgroundTask, TaskQueue};

/// Read access to a task owned by some task manager
pub trait TaskLike {
    /// Identifier, unique within the owning manager
    fn id(&self) -> &str;

    /// Display name
    fn name(&self) -> String;

    /// Current lifecycle state
    fn state(&self) -> TaskState;

    /// Human-readable status line
    fn status(&self) -> String;

    /// Progress in percent; NaN when the task has nothing to measure
    fn progress(&self) -> f64;

    /// Message of the last error, if any
    fn error(&self) -> Option<String>;
}

impl<T: TaskLike + ?Sized> TaskLike for Arc<T> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn name(&self) -> String {
        (**self).name()
    }

    fn state(&self) -> TaskState {
        (**self).state()
    }

    fn status(&self) -> String {
        (**self).status()
    }

    fn progress(&self) -> f64 {
        (**self).progress()
    }

    fn error(&self) -> Option<String> {
        (**self).error()
    }
}

/// Contract required from a task manager
///
/// One manager exists per task domain. Managers are shared between requests
/// and synchronize internally; every method is expected to return quickly and
/// may hand the actual work to background machinery.
#[async_trait]
pub trait TaskManager: Send + Sync {
    /// Task handle returned by enumeration
    type Task: TaskLike + Send + Sync;

    /// All tasks whose state is one of `states`, in the manager's order
    async fn get_by_state(&self, states: &[TaskState]) -> Vec<Self::Task>;

    /// Task with the given ID
    async fn get_by_id(&self, id: &str) -> Option<Self::Task>;

    /// Request cancellation; a missing or finished task is ignored
    async fn cancel(&self, id: &str) -> Result<()>;

    /// Forget a task; a missing task is ignored
    async fn remove(&self, id: &str) -> Result<()>;

    /// Re-queue a failed task; other states and missing tasks are ignored
    async fn retry(&self, id: &str) -> Result<()>;

    /// Forget every task in one of `states`, returning how many were removed
    async fn remove_by_state(&self, states: &[TaskState]) -> Result<usize>;

    /// Re-queue every failed task, returning how many were re-queued
    async fn retry_all_failed(&self) -> Result<usize>;
}

/// Snapshot a task into its wire representation
pub fn project<T: TaskLike + ?Sized>(task: &T) -> TaskRecord {
    let mut progress = task.progress();
    // Tasks with zero total work report 0/0.
    if progress.is_nan() {
        progress = 100.0;
    }

    TaskRecord {
        id: task.id().to_string(),
        name: task.name(),
        state: task.state(),
        status: task.status(),
        progress,
        error: task.error().unwrap_or_default(),
    }
}

/// Project every task of `manager` that is in one of `states`
pub async fn query_by_states<M>(manager: &M, states: &[TaskState]) -> Vec<TaskRecord>
where
    M: TaskManager + ?Sized,
{
    manager
        .get_by_state(states)
        .await
        .iter()
        .map(project)
        .collect()
}

/// Project the task with the given ID
///
/// # Errors
///
/// Returns [`Error::NotFound`] when the manager has no such task.
pub async fn get_by_id<M>(manager: &M, id: &str) -> Result<TaskRecord>
where
    M: TaskManager + ?Sized,
{
    manager
        .get_by_id(id)
        .await
        .map(|task| project(&task))
        .ok_or_else(|| Error::NotFound(format!("task {}", id)))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
