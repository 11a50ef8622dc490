use async_trait::async_trait;
use std::collections::HashMap;

use super::{RepoError, ScheduleId};
use crate::domain::entities::schedule::Schedule;

/// Schedule persistence as required by the use cases and the scheduler
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn get(&self, id: ScheduleId) -> Result<Schedule, RepoError>;

    /// Every schedule, including paused and removed ones
    async fn get_all(&self) -> Result<HashMap<ScheduleId, Schedule>, RepoError>;

    /// Only live, unpaused schedules — the set a scheduler tick processes
    async fn get_all_scheduled(&self) -> Result<HashMap<ScheduleId, Schedule>, RepoError>;

    async fn add(&self, schedule: Schedule) -> Result<ScheduleId, RepoError>;

    async fn update(&self, id: ScheduleId, schedule: Schedule) -> Result<(), RepoError>;
}
