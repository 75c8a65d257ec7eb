use crate::models::Countdown;
use chrono::NaiveDateTime;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Whole days/hours/minutes/seconds from `now` until `target`, floored at zero.
pub fn remaining(now: NaiveDateTime, target: NaiveDateTime) -> Countdown {
    let total = (target - now).num_seconds().max(0);
    Countdown {
        days: total / DAY,
        hours: total % DAY / HOUR,
        minutes: total % HOUR / MINUTE,
        seconds: total % MINUTE,
        finished: total == 0,
    }
}
