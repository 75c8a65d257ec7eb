use crate::date_key::DateKey;
use crate::errors::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_HABITS: [&str; 10] = [
    "Sleep 7–8 Hours",
    "Drink 5L Water",
    "Go For a Run",
    "Study 2 Hours",
    "Create Something",
    "Exercise",
    "Eat Healthy",
    "Complete Protein Intake",
    "Bathe",
    "Write a Journal",
];

/// Ordered habit names. A habit's index is its identity in every completion vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitDefinition {
    names: Vec<String>,
}

impl HabitDefinition {
    pub fn new(names: Vec<String>) -> Result<Self, CoreError> {
        if names.is_empty() {
            return Err(CoreError::validation("at least one habit must be configured"));
        }
        Ok(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn check_index(&self, index: usize) -> Result<(), CoreError> {
        if index >= self.len() {
            return Err(CoreError::validation(format!(
                "habit index {index} out of range 0..{}",
                self.len()
            )));
        }
        Ok(())
    }

    pub fn check_vector(&self, habits: &[bool]) -> Result<(), CoreError> {
        if habits.len() != self.len() {
            return Err(CoreError::validation(format!(
                "expected {} habit flags, got {}",
                self.len(),
                habits.len()
            )));
        }
        Ok(())
    }
}

impl Default for HabitDefinition {
    fn default() -> Self {
        Self {
            names: DEFAULT_HABITS.iter().map(|name| name.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DayRecord {
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub habits: Vec<bool>,
}

impl DayRecord {
    pub fn empty(habit_count: usize) -> Self {
        Self {
            note: String::new(),
            habits: vec![false; habit_count],
        }
    }

    pub fn completed(&self) -> usize {
        self.habits.iter().filter(|done| **done).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct HistoryMap {
    pub days: BTreeMap<DateKey, DayRecord>,
}

impl HistoryMap {
    pub fn get(&self, key: &DateKey) -> Option<&DayRecord> {
        self.days.get(key)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// "Today" as seen by the running process, with its resolved record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentDayContext {
    pub key: DateKey,
    pub record: DayRecord,
}

#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    #[serde(default)]
    pub date: Option<String>,
    pub note: String,
}

#[derive(Debug, Deserialize)]
pub struct HabitsRequest {
    #[serde(default)]
    pub date: Option<String>,
    pub habits: Vec<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    #[serde(default)]
    pub date: Option<String>,
    pub index: usize,
    pub value: bool,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DayResponse {
    pub date: DateKey,
    pub note: String,
    pub habits: Vec<bool>,
    pub percent: u8,
}

#[derive(Debug, Serialize)]
pub struct HabitsResponse {
    pub habits: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyPoint {
    pub date: DateKey,
    pub weekday: String,
    pub completed: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WeeklyResponse {
    pub days: Vec<DailyPoint>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayFlags {
    pub day: u32,
    pub date: DateKey,
    pub is_past: bool,
    pub is_today: bool,
    pub has_any_completion: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthProjection {
    pub month: u32,
    pub name: String,
    pub days: Vec<DayFlags>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct YearProjection {
    pub year: i32,
    pub today: DateKey,
    pub months: Vec<MonthProjection>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub finished: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountdownResponse {
    pub target: String,
    #[serde(flatten)]
    pub remaining: Countdown,
}
