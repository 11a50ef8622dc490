use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use crate::domain::clock::Clock;
use crate::domain::entities::task::Task;
use crate::domain::repositories::{RepoError, ScheduleRepository, TaskRepository};

/// Runs one scheduler tick: materializes every occurrence since each live,
/// unpaused schedule's last check, advances its checkpoint, and returns the
/// earliest upcoming occurrence across all of them (`None` when nothing is
/// scheduled or computable).
///
/// Failures on a single schedule are logged and skip that schedule only; it
/// is left unchanged and reprocessed on the next tick. Only a failure to
/// list the schedules fails the whole tick.
///
/// Materialization and the checkpoint update are two separate writes; a
/// crash between them can double-fire or drop occurrences. The repositories
/// promise per-row atomicity only, so no transaction spans the two.
pub async fn check_schedules(
    clock: &dyn Clock,
    task_repo: &dyn TaskRepository,
    schedule_repo: &dyn ScheduleRepository,
) -> Result<Option<DateTime<Utc>>, RepoError> {
    let schedules = schedule_repo.get_all_scheduled().await?;

    let now = clock.now();
    let mut next: Option<DateTime<Utc>> = None;

    'schedules: for (id, mut schedule) in schedules {
        // A schedule that has never been checked materializes nothing on its
        // first tick; otherwise it would retroactively fire for every
        // occurrence before it was added.
        if let Some(last_checked) = schedule.last_checked() {
            let times = match schedule.times(&last_checked, &now) {
                Ok(times) => times,
                Err(err) => {
                    warn!(schedule = %id, %err, "skipping schedule: could not compute occurrences");
                    continue;
                }
            };

            for template in schedule.tasks() {
                for _occurrence in &times {
                    if let Err(err) = task_repo.add(Task::from_template(template)).await {
                        error!(schedule = %id, %err, "skipping schedule: could not add task");
                        continue 'schedules;
                    }
                }
            }
        }

        // Advance the checkpoint whether or not anything fired.
        if let Err(err) = schedule.check(now) {
            debug!(schedule = %id, %err, "checkpoint not advanced");
        }
        if let Err(err) = schedule_repo.update(id, schedule.clone()).await {
            error!(schedule = %id, %err, "could not persist schedule checkpoint");
            continue;
        }

        match schedule.next_time(&now) {
            Ok(n) => next = Some(next.map_or(n, |current| current.min(n))),
            Err(err) => debug!(schedule = %id, %err, "no upcoming occurrence"),
        }
    }

    Ok(next)
}
