//! Drives the spawned scheduler worker over its control channels with a
//! manual clock pinned far from any timer expiry, so every wake-up in these
//! tests comes from an explicit signal.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

use scheduled_tasks::application::services::ScheduleService;
use scheduled_tasks::domain::clock::ManualClock;
use scheduled_tasks::domain::entities::schedule::Schedule;
use scheduled_tasks::domain::repositories::{ScheduleRepository, TaskRepository};
use scheduled_tasks::domain::value_objects::frequency::Frequency;
use scheduled_tasks::domain::value_objects::recurring_task::RecurringTask;
use scheduled_tasks::infrastructure::repositories::{
    MemoryScheduleRepository, MemoryTaskRepository,
};
use scheduled_tasks::infrastructure::scheduler::{DEFAULT_WAIT, RUN_OFFSET, start};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn utc(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, 1, h, m, 0).unwrap()
}

async fn next_run(rx: &mut mpsc::Receiver<DateTime<Utc>>) -> DateTime<Utc> {
    timeout(RECV_TIMEOUT, rx.recv())
        .await
        .expect("worker should publish a next run time")
        .expect("next run channel should stay open")
}

#[tokio::test]
async fn empty_repo_waits_the_default_and_closes_cleanly() {
    init_tracing();
    let now = utc(12, 0);
    let clock = Arc::new(ManualClock::new(now));
    let tasks = Arc::new(MemoryTaskRepository::new());
    let schedules = Arc::new(MemoryScheduleRepository::new());
    let (observer_tx, mut observer_rx) = mpsc::channel(1);

    let (close_tx, _check_tx, closed_rx) =
        start(clock, tasks, schedules, Some(observer_tx));

    assert_eq!(next_run(&mut observer_rx).await, now + DEFAULT_WAIT + RUN_OFFSET);

    close_tx.send(()).await.unwrap();
    timeout(RECV_TIMEOUT, closed_rx)
        .await
        .expect("worker should close promptly")
        .expect("worker should acknowledge the close");
}

#[tokio::test]
async fn unchecked_schedule_fires_nothing_but_drives_the_wake_time() {
    init_tracing();
    let clock = Arc::new(ManualClock::new(utc(12, 30)));
    let tasks = Arc::new(MemoryTaskRepository::new());
    let schedules = Arc::new(MemoryScheduleRepository::new());

    let mut s = Schedule::new(Frequency::new_hour(vec![25]).unwrap());
    s.add_task(RecurringTask::new("t1", "t1desc")).unwrap();
    schedules.add(s).await.unwrap();

    let (observer_tx, mut observer_rx) = mpsc::channel(1);
    let (close_tx, _check_tx, closed_rx) =
        start(clock, tasks.clone(), schedules, Some(observer_tx));

    // the 12:25 occurrence predates the schedule's first check
    assert_eq!(next_run(&mut observer_rx).await, utc(13, 25) + RUN_OFFSET);
    assert!(tasks.get_all().await.unwrap().is_empty());

    close_tx.send(()).await.unwrap();
    timeout(RECV_TIMEOUT, closed_rx).await.unwrap().unwrap();
}

#[tokio::test]
async fn check_signal_reruns_the_tick_and_materializes_due_tasks() {
    init_tracing();
    let clock = Arc::new(ManualClock::new(utc(12, 30)));
    let tasks = Arc::new(MemoryTaskRepository::new());
    let schedules = Arc::new(MemoryScheduleRepository::new());

    let mut s = Schedule::new(Frequency::new_hour(vec![25]).unwrap());
    s.add_task(RecurringTask::new("t1", "t1desc")).unwrap();
    s.check(utc(12, 0)).unwrap();
    schedules.add(s).await.unwrap();

    let (observer_tx, mut observer_rx) = mpsc::channel(1);
    let (close_tx, check_tx, closed_rx) =
        start(clock.clone(), tasks.clone(), schedules, Some(observer_tx));

    // first tick catches the 12:25 occurrence
    assert_eq!(next_run(&mut observer_rx).await, utc(13, 25) + RUN_OFFSET);
    assert_eq!(tasks.get_all().await.unwrap().len(), 1);

    // jump past the next occurrence and nudge the worker
    clock.set(utc(13, 30));
    check_tx.send(()).await.unwrap();
    assert_eq!(next_run(&mut observer_rx).await, utc(14, 25) + RUN_OFFSET);
    assert_eq!(tasks.get_all().await.unwrap().len(), 2);

    close_tx.send(()).await.unwrap();
    timeout(RECV_TIMEOUT, closed_rx).await.unwrap().unwrap();
}

#[tokio::test]
async fn pausing_suppresses_occurrences_until_unpaused() {
    init_tracing();
    let clock = Arc::new(ManualClock::new(utc(12, 1)));
    let tasks = Arc::new(MemoryTaskRepository::new());
    let schedules = Arc::new(MemoryScheduleRepository::new());

    let mut s = Schedule::new(Frequency::new_hour(vec![5, 10, 15]).unwrap());
    s.add_task(RecurringTask::new("t1", "t1desc")).unwrap();
    s.check(utc(12, 1)).unwrap();
    schedules.add(s).await.unwrap();

    let (observer_tx, mut observer_rx) = mpsc::channel(1);
    let (close_tx, check_tx, closed_rx) =
        start(clock.clone(), tasks.clone(), schedules.clone(), Some(observer_tx));
    let service = ScheduleService::new(schedules.clone(), clock.clone(), check_tx.clone());
    let id = scheduled_tasks::domain::repositories::ScheduleId(1);

    // nothing due at 12:01
    assert_eq!(next_run(&mut observer_rx).await, utc(12, 5) + RUN_OFFSET);
    assert!(tasks.get_all().await.unwrap().is_empty());

    // paused schedules drop out of the tick entirely
    service.pause_schedule(id).await.unwrap();
    assert_eq!(
        next_run(&mut observer_rx).await,
        utc(12, 1) + DEFAULT_WAIT + RUN_OFFSET
    );

    // unpausing at 12:07 fast-forwards past the 12:05 occurrence
    clock.set(utc(12, 7));
    service.unpause_schedule(id).await.unwrap();
    assert_eq!(next_run(&mut observer_rx).await, utc(12, 10) + RUN_OFFSET);
    assert!(tasks.get_all().await.unwrap().is_empty());

    // the tick at 12:11 materializes only the 12:10 occurrence
    clock.set(utc(12, 11));
    check_tx.send(()).await.unwrap();
    assert_eq!(next_run(&mut observer_rx).await, utc(12, 15) + RUN_OFFSET);
    let created = tasks.get_all().await.unwrap();
    assert_eq!(created.len(), 1);
    assert!(created.values().all(|t| t.name() == "t1"));

    close_tx.send(()).await.unwrap();
    timeout(RECV_TIMEOUT, closed_rx).await.unwrap().unwrap();
}

#[tokio::test]
async fn dropping_the_close_handle_shuts_the_worker_down() {
    init_tracing();
    let clock = Arc::new(ManualClock::new(utc(12, 0)));
    let tasks = Arc::new(MemoryTaskRepository::new());
    let schedules = Arc::new(MemoryScheduleRepository::new());

    let (close_tx, _check_tx, closed_rx) = start(clock, tasks, schedules, None);

    drop(close_tx);
    timeout(RECV_TIMEOUT, closed_rx)
        .await
        .expect("worker should exit once the close handle is gone")
        .expect("worker should acknowledge the close");
}
