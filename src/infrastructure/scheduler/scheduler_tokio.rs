use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::application::services::scheduler_service::check_schedules;
use crate::domain::clock::Clock;
use crate::domain::repositories::{ScheduleRepository, TaskRepository};

/// Cushion added to the next occurrence so the worker wakes just past the
/// boundary instead of racing it
pub const RUN_OFFSET: Duration = Duration::from_secs(3);

/// How long the worker sleeps when no schedule has an upcoming occurrence
pub const DEFAULT_WAIT: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// What woke the worker out of its between-tick wait
enum WakeEvent {
    Close,
    Check,
    Timer,
}

/// Spawns the scheduler worker and returns its control channels:
/// send on the first to request shutdown, send on the second to request an
/// immediate re-tick, and await the receiver to confirm the worker exited.
///
/// Exactly one worker runs per call; ticks are strictly sequential and never
/// interrupted. A close request is honored between ticks only, and check
/// requests are droppable: senders should use `try_send` and accept that a
/// busy worker misses the nudge. Each tick's next wake time is published on
/// `next_run` when an observer is given; like the repositories, that send is
/// blocking, so a present-but-idle observer stalls the loop.
pub fn start(
    clock: Arc<dyn Clock>,
    task_repo: Arc<dyn TaskRepository>,
    schedule_repo: Arc<dyn ScheduleRepository>,
    next_run: Option<mpsc::Sender<DateTime<Utc>>>,
) -> (mpsc::Sender<()>, mpsc::Sender<()>, oneshot::Receiver<()>) {
    info!("scheduler worker starting");

    let (close_tx, mut close_rx) = mpsc::channel::<()>(1);
    let (check_tx, mut check_rx) = mpsc::channel::<()>(1);
    let (closed_tx, closed_rx) = oneshot::channel::<()>();

    // held by the worker so a dropped caller-side check handle reads as
    // silence rather than a closed channel
    let check_guard = check_tx.clone();

    tokio::spawn(async move {
        let _check_guard = check_guard;
        loop {
            debug!("checking schedules");
            let next_recurrence = match check_schedules(
                clock.as_ref(),
                task_repo.as_ref(),
                schedule_repo.as_ref(),
            )
            .await
            {
                Ok(next) => next,
                Err(err) => {
                    error!(%err, "error checking schedules");
                    None
                }
            };
            let next_recurrence = next_recurrence.unwrap_or_else(|| {
                debug!("no upcoming occurrences, waiting the default {DEFAULT_WAIT:?}");
                clock.now() + DEFAULT_WAIT
            });

            let next_run_time = next_recurrence + RUN_OFFSET;
            debug!(%next_run_time, "next run scheduled");

            if let Some(observer) = &next_run {
                // a dropped observer is ignored
                let _ = observer.send(next_run_time).await;
            }

            let wait = clock.until(next_run_time).max(Duration::from_millis(1));

            let event = tokio::select! {
                // recv yields None once every close handle is dropped;
                // either way the worker shuts down
                _ = close_rx.recv() => WakeEvent::Close,
                _ = check_rx.recv() => WakeEvent::Check,
                () = clock.after(wait) => WakeEvent::Timer,
            };
            match event {
                WakeEvent::Close => {
                    info!("scheduler worker exiting");
                    break;
                }
                WakeEvent::Check => debug!("check requested, re-running now"),
                WakeEvent::Timer => {}
            }
        }
        let _ = closed_tx.send(());
    });

    (close_tx, check_tx, closed_rx)
}
