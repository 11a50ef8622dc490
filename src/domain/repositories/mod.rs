pub mod schedule_repository;
pub mod task_repository;

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

pub use schedule_repository::ScheduleRepository;
pub use task_repository::TaskRepository;

/// Persistent ID of a materialized task
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TaskId(pub i64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persistent ID of a schedule
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ScheduleId(pub i64);

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque failures from the persistence layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    NotFound(String),
    Storage(String),
}

impl fmt::Display for RepoError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RepoError::NotFound(msg) => write!(f, "record not found: {msg}"),
            RepoError::Storage(msg) => write!(f, "storage error: {msg}"),
        }
    }
}

impl Error for RepoError {}
