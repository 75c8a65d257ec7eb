use crate::date_key::DateKey;
use crate::errors::CoreError;
use crate::models::{DayFlags, HistoryMap, MonthProjection, YearProjection};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Per-day display flags for all twelve months of `year`.
///
/// Lookups only; days without a record are reported as not completed.
pub fn project_year(history: &HistoryMap, year: i32, today: DateKey) -> Result<YearProjection, CoreError> {
    // validates the year range for the whole projection
    DateKey::from_ymd(year, 1, 1)?;

    let months = MONTH_NAMES
        .iter()
        .zip(1u32..)
        .map(|(name, month)| MonthProjection {
            month,
            name: (*name).to_string(),
            days: (1..=31)
                .map_while(|day| DateKey::from_ymd(year, month, day).ok().map(|key| (day, key)))
                .map(|(day, key)| DayFlags {
                    day,
                    date: key,
                    is_past: key.to_string() < today.to_string(),
                    is_today: key == today,
                    has_any_completion: history.get(&key).is_some_and(|record| record.completed() > 0),
                })
                .collect(),
        })
        .collect();

    Ok(YearProjection { year, today, months })
}
