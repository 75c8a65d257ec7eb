use chrono::{Duration as ChronoDuration, Local, NaiveDateTime, NaiveTime, TimeZone};
use std::time::Duration;
use tokio::time::Instant;

/// Source of local wall-clock time.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> NaiveDateTime;

    /// Time left until the next local midnight, measured from `now()`.
    fn until_next_midnight(&self) -> Duration {
        let now = self.now();
        duration_between(now, next_midnight(now))
    }
}

/// The machine's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn until_next_midnight(&self) -> Duration {
        let now = Local::now();
        let target = next_midnight(now.naive_local());
        match Local.from_local_datetime(&target).earliest() {
            Some(at) => (at - now).to_std().unwrap_or(Duration::ZERO),
            // midnight skipped by a DST jump; the scheduler re-checks after waking
            None => duration_between(now.naive_local(), target),
        }
    }
}

/// Starts at a fixed local wall time and advances with the runtime clock.
///
/// Backed by `tokio::time::Instant`, so a paused test runtime drives it too.
#[derive(Debug, Clone, Copy)]
pub struct OffsetClock {
    origin: NaiveDateTime,
    started: Instant,
}

impl OffsetClock {
    pub fn starting_at(origin: NaiveDateTime) -> Self {
        Self {
            origin,
            started: Instant::now(),
        }
    }
}

impl Clock for OffsetClock {
    fn now(&self) -> NaiveDateTime {
        let elapsed = ChronoDuration::from_std(self.started.elapsed()).unwrap_or(ChronoDuration::zero());
        self.origin + elapsed
    }
}

pub fn next_midnight(now: NaiveDateTime) -> NaiveDateTime {
    (now.date() + ChronoDuration::days(1)).and_time(NaiveTime::MIN)
}

fn duration_between(from: NaiveDateTime, to: NaiveDateTime) -> Duration {
    (to - from).to_std().unwrap_or(Duration::ZERO)
}
