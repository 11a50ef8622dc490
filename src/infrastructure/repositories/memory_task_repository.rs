use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::Mutex;

use super::json_storage;
use crate::domain::entities::task::Task;
use crate::domain::repositories::{RepoError, TaskId, TaskRepository};

#[derive(Default)]
struct TaskStore {
    last_id: i64,
    tasks: HashMap<TaskId, Task>,
}

/// In-memory implementation of [`TaskRepository`] with auto-incrementing ids
/// and optional JSON snapshot persistence
#[derive(Default)]
pub struct MemoryTaskRepository {
    store: Mutex<TaskStore>,
}

impl MemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Saves every task to a JSON snapshot file
    pub async fn save_all(&self, path: &Path) -> Result<()> {
        let store = self.store.lock().await;
        let rows: Vec<(TaskId, Task)> = store
            .tasks
            .iter()
            .map(|(id, task)| (*id, task.clone()))
            .collect();
        json_storage::save(&rows, path)
    }

    /// Loads tasks from a JSON snapshot file, keeping ids stable
    pub async fn load_all(&self, path: &Path) -> Result<()> {
        let rows: Vec<(TaskId, Task)> = json_storage::load(path)?;
        let mut store = self.store.lock().await;
        for (id, task) in rows {
            store.last_id = store.last_id.max(id.0);
            store.tasks.insert(id, task);
        }
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for MemoryTaskRepository {
    async fn add(&self, task: Task) -> Result<TaskId, RepoError> {
        let mut store = self.store.lock().await;
        store.last_id += 1;
        let id = TaskId(store.last_id);
        store.tasks.insert(id, task);
        Ok(id)
    }

    async fn get_all(&self) -> Result<HashMap<TaskId, Task>, RepoError> {
        let store = self.store.lock().await;
        Ok(store.tasks.clone())
    }
}
