use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

use crate::domain::value_objects::frequency::{Frequency, FrequencyError};
use crate::domain::value_objects::recurring_task::RecurringTask;

/// Invariant violations on the schedule aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// `check` called with a time at or before the current checkpoint
    NonMonotonicCheck,
    /// `add_task` found a structurally equal task already on the schedule
    DuplicateTask,
    /// `remove_task` found no structurally equal task on the schedule
    TaskNotFound,
    /// `remove` called on a schedule that was already removed
    AlreadyRemoved,
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScheduleError::NonMonotonicCheck => {
                write!(f, "new check time must be later than the last checked time")
            }
            ScheduleError::DuplicateTask => {
                write!(f, "an identical task already exists for this schedule")
            }
            ScheduleError::TaskNotFound => write!(f, "no matching task found on this schedule"),
            ScheduleError::AlreadyRemoved => write!(f, "schedule has already been removed"),
        }
    }
}

impl Error for ScheduleError {}

/// A collection of recurring task templates firing at one frequency.
///
/// Lifecycle: created unpaused, toggled with `pause`/`unpause`, and ended
/// with `remove` — removal is terminal and gates every other mutator via
/// `is_valid`. `last_checked` only ever moves forward; the window
/// `(last_checked, now]` is what the scheduler materializes on each tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    frequency: Frequency,
    paused: bool,
    last_checked: Option<DateTime<Utc>>,
    tasks: Vec<RecurringTask>,
    removed: Option<DateTime<Utc>>,
}

impl Schedule {
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            paused: false,
            last_checked: None,
            tasks: Vec::new(),
            removed: None,
        }
    }

    /// Rehydrates a schedule from stored fields
    pub fn new_raw(
        frequency: Frequency,
        paused: bool,
        last_checked: Option<DateTime<Utc>>,
        tasks: Vec<RecurringTask>,
        removed: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            frequency,
            paused,
            last_checked,
            tasks,
            removed,
        }
    }

    pub fn frequency(&self) -> &Frequency {
        &self.frequency
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn last_checked(&self) -> Option<DateTime<Utc>> {
        self.last_checked
    }

    pub fn removed_time(&self) -> Option<DateTime<Utc>> {
        self.removed
    }

    pub fn tasks(&self) -> &[RecurringTask] {
        &self.tasks
    }

    /// Whether the schedule is live and can be operated upon
    pub fn is_valid(&self) -> bool {
        self.removed.is_none()
    }

    /// Idempotent
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resumes the schedule and fast-forwards the checkpoint to `now`, so
    /// occurrences that fell inside the paused window are never materialized
    pub fn unpause(&mut self, now: DateTime<Utc>) {
        if self.paused {
            self.paused = false;
            // a checkpoint already at or past `now` stays where it is
            let _ = self.check(now);
        }
    }

    /// Advances the checkpoint; rejects any time that does not move it
    /// strictly forward
    pub fn check(&mut self, time: DateTime<Utc>) -> Result<(), ScheduleError> {
        match self.last_checked {
            Some(last) if time <= last => Err(ScheduleError::NonMonotonicCheck),
            _ => {
                self.last_checked = Some(time);
                Ok(())
            }
        }
    }

    /// Marks the schedule removed; terminal
    pub fn remove(&mut self, now: DateTime<Utc>) -> Result<(), ScheduleError> {
        if self.removed.is_some() {
            return Err(ScheduleError::AlreadyRemoved);
        }
        self.removed = Some(now);
        Ok(())
    }

    pub fn add_task(&mut self, task: RecurringTask) -> Result<(), ScheduleError> {
        if self.tasks.contains(&task) {
            return Err(ScheduleError::DuplicateTask);
        }
        self.tasks.push(task);
        Ok(())
    }

    pub fn remove_task(&mut self, task: &RecurringTask) -> Result<(), ScheduleError> {
        let index = self
            .tasks
            .iter()
            .position(|t| t == task)
            .ok_or(ScheduleError::TaskNotFound)?;
        self.tasks.remove(index);
        Ok(())
    }

    /// Scheduled occurrences between `start` and `end`, inclusive
    pub fn times(
        &self,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, FrequencyError> {
        self.frequency.times(start, end)
    }

    /// The next scheduled occurrence strictly after `after`
    pub fn next_time(&self, after: &DateTime<Utc>) -> Result<DateTime<Utc>, FrequencyError> {
        self.frequency.next(after)
    }
}
