use async_trait::async_trait;
use std::collections::HashMap;

use super::{RepoError, TaskId};
use crate::domain::entities::task::Task;

/// Task persistence as required by the scheduler
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Persists a task and returns its assigned ID
    async fn add(&self, task: Task) -> Result<TaskId, RepoError>;

    /// All persisted tasks keyed by ID
    async fn get_all(&self) -> Result<HashMap<TaskId, Task>, RepoError>;
}
