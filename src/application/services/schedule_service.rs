use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::clock::Clock;
use crate::domain::entities::schedule::{Schedule, ScheduleError};
use crate::domain::repositories::{RepoError, ScheduleId, ScheduleRepository};
use crate::domain::value_objects::recurring_task::RecurringTask;

/// Failures surfaced by the schedule use cases
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    NotFound(String),
    Duplicate(String),
    Invalid(String),
    Storage(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ServiceError::NotFound(msg) => write!(f, "not found: {msg}"),
            ServiceError::Duplicate(msg) => write!(f, "duplicate: {msg}"),
            ServiceError::Invalid(msg) => write!(f, "invalid: {msg}"),
            ServiceError::Storage(msg) => write!(f, "storage error: {msg}"),
        }
    }
}

impl Error for ServiceError {}

impl From<RepoError> for ServiceError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => ServiceError::NotFound(msg),
            RepoError::Storage(msg) => ServiceError::Storage(msg),
        }
    }
}

/// Live-editing use cases over the schedule repository.
///
/// Mutations that change what or when the scheduler should fire nudge the
/// background worker over the `check` channel so edits take effect without
/// waiting out the current sleep. The nudge is best-effort: if the worker is
/// mid-tick and not listening, the signal is dropped and the tick it is
/// already running picks up the change.
pub struct ScheduleService {
    repo: Arc<dyn ScheduleRepository>,
    clock: Arc<dyn Clock>,
    check: mpsc::Sender<()>,
}

impl ScheduleService {
    pub fn new(
        repo: Arc<dyn ScheduleRepository>,
        clock: Arc<dyn Clock>,
        check: mpsc::Sender<()>,
    ) -> Self {
        Self { repo, clock, check }
    }

    pub async fn get_schedule(&self, id: ScheduleId) -> Result<Schedule, ServiceError> {
        let schedule = self.repo.get(id).await?;
        if !schedule.is_valid() {
            return Err(ServiceError::NotFound(format!("schedule id {id} not found")));
        }
        Ok(schedule)
    }

    /// All live schedules, paused or not
    pub async fn list_schedules(&self) -> Result<HashMap<ScheduleId, Schedule>, ServiceError> {
        let all = self.repo.get_all().await?;
        Ok(all.into_iter().filter(|(_, s)| s.is_valid()).collect())
    }

    pub async fn add_schedule(&self, schedule: Schedule) -> Result<ScheduleId, ServiceError> {
        let id = self.repo.add(schedule).await?;
        self.request_check();
        Ok(id)
    }

    pub async fn pause_schedule(&self, id: ScheduleId) -> Result<(), ServiceError> {
        let mut schedule = self.get_schedule(id).await?;
        schedule.pause();
        self.repo.update(id, schedule).await?;
        self.request_check();
        Ok(())
    }

    pub async fn unpause_schedule(&self, id: ScheduleId) -> Result<(), ServiceError> {
        let mut schedule = self.get_schedule(id).await?;
        schedule.unpause(self.clock.now());
        self.repo.update(id, schedule).await?;
        self.request_check();
        Ok(())
    }

    pub async fn remove_schedule(&self, id: ScheduleId) -> Result<(), ServiceError> {
        let mut schedule = self.repo.get(id).await?;
        schedule
            .remove(self.clock.now())
            .map_err(|_| ServiceError::NotFound(format!("schedule id {id} not found")))?;
        self.repo.update(id, schedule).await?;
        self.request_check();
        Ok(())
    }

    pub async fn add_recurring_task(
        &self,
        id: ScheduleId,
        task: RecurringTask,
    ) -> Result<(), ServiceError> {
        let mut schedule = self.get_schedule(id).await?;
        schedule.add_task(task).map_err(|err| match err {
            ScheduleError::DuplicateTask => ServiceError::Duplicate(format!(
                "identical recurring task already exists on schedule id {id}"
            )),
            other => ServiceError::Invalid(other.to_string()),
        })?;
        self.repo.update(id, schedule).await?;
        Ok(())
    }

    pub async fn remove_recurring_task(
        &self,
        id: ScheduleId,
        task: &RecurringTask,
    ) -> Result<(), ServiceError> {
        let mut schedule = self.get_schedule(id).await?;
        schedule.remove_task(task).map_err(|err| match err {
            ScheduleError::TaskNotFound => ServiceError::NotFound(format!(
                "no matching recurring task on schedule id {id}"
            )),
            other => ServiceError::Invalid(other.to_string()),
        })?;
        self.repo.update(id, schedule).await?;
        Ok(())
    }

    /// Droppable wake-up for the scheduler worker
    fn request_check(&self) {
        if self.check.try_send(()).is_err() {
            debug!("scheduler check signal dropped (worker busy or gone)");
        }
    }
}
