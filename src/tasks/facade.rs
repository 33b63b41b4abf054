//! Type-erased control surface over one task manager per domain.

use crate::error::{Error, Result};
use crate::types::{TaskDomain, TaskRecord, TaskState};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use super::{TaskManager, get_by_id, query_by_states};

/// Queries and control actions available on every task domain
///
/// Control actions are fire-and-forget: they return once the request has
/// been handed to the manager, not once the task reached its next state.
#[async_trait]
pub trait TaskControl: Send + Sync {
    /// Records of tasks in any of `states`
    async fn query(&self, states: &[TaskState]) -> Vec<TaskRecord>;

    /// Record of one task
    async fn info(&self, id: &str) -> Result<TaskRecord>;

    /// Request cancellation of one task
    async fn cancel(&self, id: &str) -> Result<()>;

    /// Forget one task
    async fn remove(&self, id: &str) -> Result<()>;

    /// Re-queue one failed task
    async fn retry(&self, id: &str) -> Result<()>;

    /// Forget every task in any of `states`
    async fn clear_by_states(&self, states: &[TaskState]) -> Result<()>;

    /// Re-queue every failed task
    async fn retry_all_failed(&self) -> Result<()>;

    /// Records of tasks still in progress
    async fn undone(&self) -> Vec<TaskRecord> {
        self.query(&TaskState::UNFINISHED).await
    }

    /// Records of tasks in a terminal state
    async fn done(&self) -> Vec<TaskRecord> {
        self.query(&TaskState::FINISHED).await
    }

    /// Forget every task in a terminal state
    async fn clear_done(&self) -> Result<()> {
        self.clear_by_states(&TaskState::FINISHED).await
    }

    /// Forget every successfully finished task
    async fn clear_succeeded(&self) -> Result<()> {
        self.clear_by_states(&[TaskState::Succeeded]).await
    }
}

/// [`TaskControl`] implementation for a concrete manager
pub struct TaskFacade<M> {
    domain: TaskDomain,
    manager: Arc<M>,
}

impl<M: TaskManager> TaskFacade<M> {
    /// Wrap the manager serving `domain`
    pub fn new(domain: TaskDomain, manager: Arc<M>) -> Self {
        Self { domain, manager }
    }

    /// Domain this facade serves
    pub fn domain(&self) -> TaskDomain {
        self.domain
    }
}

#[async_trait]
impl<M: TaskManager + 'static> TaskControl for TaskFacade<M> {
    async fn query(&self, states: &[TaskState]) -> Vec<TaskRecord> {
        query_by_states(self.manager.as_ref(), states).await
    }

    async fn info(&self, id: &str) -> Result<TaskRecord> {
        get_by_id(self.manager.as_ref(), id).await
    }

    async fn cancel(&self, id: &str) -> Result<()> {
        tracing::debug!(domain = %self.domain, task_id = id, "Cancel requested");
        self.manager.cancel(id).await
    }

    async fn remove(&self, id: &str) -> Result<()> {
        tracing::debug!(domain = %self.domain, task_id = id, "Remove requested");
        self.manager.remove(id).await
    }

    async fn retry(&self, id: &str) -> Result<()> {
        tracing::debug!(domain = %self.domain, task_id = id, "Retry requested");
        self.manager.retry(id).await
    }

    async fn clear_by_states(&self, states: &[TaskState]) -> Result<()> {
        let removed = self.manager.remove_by_state(states).await?;
        tracing::debug!(domain = %self.domain, ?states, removed, "Cleared tasks");
        Ok(())
    }

    async fn retry_all_failed(&self) -> Result<()> {
        let retried = self.manager.retry_all_failed().await?;
        tracing::debug!(domain = %self.domain, retried, "Retried failed tasks");
        Ok(())
    }
}

/// Maps each task domain to the facade over its manager
#[derive(Clone, Default)]
pub struct TaskRegistry {
    facades: HashMap<TaskDomain, Arc<dyn TaskControl>>,
}

impl TaskRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `domain` from `manager`, replacing any previous registration
    pub fn register<M>(mut self, domain: TaskDomain, manager: Arc<M>) -> Self
    where
        M: TaskManager + 'static,
    {
        self.facades
            .insert(domain, Arc::new(TaskFacade::new(domain, manager)));
        self
    }

    /// Facade for a domain
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no manager is registered for `domain`.
    pub fn get(&self, domain: TaskDomain) -> Result<Arc<dyn TaskControl>> {
        self.facades
            .get(&domain)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("task domain '{}'", domain)))
    }

    /// Facade for a domain given by its path segment (e.g. "offline_download")
    pub fn resolve(&self, segment: &str) -> Result<Arc<dyn TaskControl>> {
        self.get(segment.parse()?)
    }

    /// Registered domains, in [`TaskDomain::ALL`] order
    pub fn domains(&self) -> Vec<TaskDomain> {
        TaskDomain::ALL
            .into_iter()
            .filter(|d| self.facades.contains_key(d))
            .collect()
    }
}
