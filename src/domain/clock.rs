use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;
use std::time::Duration as StdDuration;

/// Injectable time source for every time-dependent component.
///
/// Production code uses [`SystemClock`]; tests inject a [`ManualClock`] so
/// "now" can be pinned or advanced without sleeping.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Duration from now until `t`, floored at zero
    fn until(&self, t: DateTime<Utc>) -> StdDuration {
        (t - self.now()).to_std().unwrap_or(StdDuration::ZERO)
    }

    /// Completes once `wait` has elapsed
    async fn after(&self, wait: StdDuration);
}

/// Wall-clock time via `chrono` and `tokio::time`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn after(&self, wait: StdDuration) {
        tokio::time::sleep(wait).await;
    }
}

/// Test clock with a settable "now". `after` still runs a real timer, which
/// lets a select loop block on a far-future wake while the test drives it
/// over its signal channels.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    async fn after(&self, wait: StdDuration) {
        tokio::time::sleep(wait).await;
    }
}
