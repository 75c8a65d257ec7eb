use crate::clock::{Clock, OffsetClock, SystemClock};
use crate::errors::CoreError;
use crate::models::HabitDefinition;
use chrono::NaiveDateTime;
use std::{env, path::PathBuf, sync::Arc, time::Duration};

const WALL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const DEFAULT_COUNTDOWN_TARGET: &str = "2026-06-01T23:59:59";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub habits: HabitDefinition,
    pub note_debounce: Duration,
    /// Simulated local wall time at startup; the system clock when unset.
    pub clock_start: Option<NaiveDateTime>,
    pub countdown_target: NaiveDateTime,
}

impl Config {
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);

        let data_path = lookup("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/state.json"));

        let habits = match lookup("APP_HABITS") {
            Some(raw) => HabitDefinition::new(
                raw.split(';')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(String::from)
                    .collect(),
            )?,
            None => HabitDefinition::default(),
        };

        let note_debounce = match lookup("APP_NOTE_DEBOUNCE_MS") {
            Some(raw) => Duration::from_millis(raw.trim().parse().map_err(|_| {
                CoreError::validation(format!("APP_NOTE_DEBOUNCE_MS '{raw}' is not a number"))
            })?),
            None => Duration::from_millis(500),
        };

        let clock_start = lookup("APP_CLOCK_START")
            .map(|raw| parse_wall_time("APP_CLOCK_START", &raw))
            .transpose()?;

        let countdown_target = parse_wall_time(
            "APP_COUNTDOWN_TARGET",
            &lookup("APP_COUNTDOWN_TARGET").unwrap_or_else(|| DEFAULT_COUNTDOWN_TARGET.to_string()),
        )?;

        Ok(Self {
            port,
            data_path,
            habits,
            note_debounce,
            clock_start,
            countdown_target,
        })
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        match self.clock_start {
            Some(origin) => Arc::new(OffsetClock::starting_at(origin)),
            None => Arc::new(SystemClock),
        }
    }
}

fn parse_wall_time(name: &str, raw: &str) -> Result<NaiveDateTime, CoreError> {
    NaiveDateTime::parse_from_str(raw.trim(), WALL_TIME_FORMAT)
        .map_err(|err| CoreError::validation(format!("{name} '{raw}': {err}")))
}
