use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::reconcile::any_tasks_modified;
use crate::domain::entities::schedule::Schedule;
use crate::domain::repositories::{RepoError, ScheduleId, ScheduleRepository};
use crate::domain::value_objects::recurring_task::RecurringTask;

#[derive(Default)]
struct ScheduleStore {
    last_id: i64,
    last_task_row_id: i64,
    schedules: HashMap<ScheduleId, Schedule>,
    // recurring tasks as they would sit in persistent rows, keyed by row id
    task_rows: HashMap<ScheduleId, HashMap<i64, RecurringTask>>,
}

impl ScheduleStore {
    fn insert_task_rows(&mut self, id: ScheduleId, tasks: &[RecurringTask]) {
        let mut rows = HashMap::new();
        for task in tasks {
            self.last_task_row_id += 1;
            rows.insert(self.last_task_row_id, task.clone());
        }
        self.task_rows.insert(id, rows);
    }
}

/// In-memory implementation of [`ScheduleRepository`].
///
/// Mirrors the shape of row-based persistence: recurring tasks are held in an
/// identifier-keyed side table, and `update` only rewrites that table when
/// the multiset diff says the task set actually changed.
#[derive(Default)]
pub struct MemoryScheduleRepository {
    store: Mutex<ScheduleStore>,
}

impl MemoryScheduleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persisted recurring task rows for a schedule, keyed by row id.
    /// Exposed for tests asserting on replace-all-write avoidance.
    pub async fn task_rows(&self, id: ScheduleId) -> HashMap<i64, RecurringTask> {
        let store = self.store.lock().await;
        store.task_rows.get(&id).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ScheduleRepository for MemoryScheduleRepository {
    async fn get(&self, id: ScheduleId) -> Result<Schedule, RepoError> {
        let store = self.store.lock().await;
        store
            .schedules
            .get(&id)
            .cloned()
            .ok_or_else(|| RepoError::NotFound(format!("no schedule with id {id}")))
    }

    async fn get_all(&self) -> Result<HashMap<ScheduleId, Schedule>, RepoError> {
        let store = self.store.lock().await;
        Ok(store.schedules.clone())
    }

    async fn get_all_scheduled(&self) -> Result<HashMap<ScheduleId, Schedule>, RepoError> {
        let store = self.store.lock().await;
        Ok(store
            .schedules
            .iter()
            .filter(|(_, s)| s.is_valid() && !s.paused())
            .map(|(id, s)| (*id, s.clone()))
            .collect())
    }

    async fn add(&self, schedule: Schedule) -> Result<ScheduleId, RepoError> {
        let mut store = self.store.lock().await;
        store.last_id += 1;
        let id = ScheduleId(store.last_id);
        store.insert_task_rows(id, schedule.tasks());
        store.schedules.insert(id, schedule);
        Ok(id)
    }

    async fn update(&self, id: ScheduleId, schedule: Schedule) -> Result<(), RepoError> {
        let mut store = self.store.lock().await;
        if !store.schedules.contains_key(&id) {
            return Err(RepoError::NotFound(format!("no schedule with id {id}")));
        }

        let existing_rows = store.task_rows.entry(id).or_default();
        if any_tasks_modified(existing_rows, schedule.tasks()) {
            store.insert_task_rows(id, schedule.tasks());
        }
        store.schedules.insert(id, schedule);
        Ok(())
    }
}
