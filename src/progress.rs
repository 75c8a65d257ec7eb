use crate::date_key::DateKey;
use crate::models::{DailyPoint, DayRecord, HabitDefinition, HistoryMap};

pub const WEEK_DAYS: i64 = 7;

/// Share of configured habits done on a day, rounded half up to 0..=100.
pub fn completion_percent(record: &DayRecord, habits: &HabitDefinition) -> u8 {
    let total = habits.len();
    let done = record.completed().min(total);
    ((200 * done + total) / (2 * total)) as u8
}

/// Completed-habit counts for the seven days ending at `anchor`, oldest first.
///
/// Days without a record count as zero.
pub fn weekly_series(history: &HistoryMap, anchor: DateKey) -> Vec<DailyPoint> {
    (0..WEEK_DAYS)
        .rev()
        .map(|offset| {
            let date = anchor.offset_days(-offset);
            DailyPoint {
                date,
                weekday: date.date().format("%a").to_string(),
                completed: history.get(&date).map(DayRecord::completed).unwrap_or_default(),
            }
        })
        .collect()
}
