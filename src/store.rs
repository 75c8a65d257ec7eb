use crate::date_key::DateKey;
use crate::errors::CoreError;
use crate::events::{ChangeEvent, Notifier};
use crate::models::{DayRecord, HabitDefinition, HistoryMap};
use crate::storage::JsonFile;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

pub type SharedStore = Arc<Mutex<DayStore>>;

#[derive(Debug)]
pub struct DayStore {
    habits: HabitDefinition,
    history: HistoryMap,
    backend: JsonFile,
    notifier: Notifier,
}

impl DayStore {
    pub async fn open(
        backend: JsonFile,
        habits: HabitDefinition,
        notifier: Notifier,
    ) -> Result<Self, CoreError> {
        let history = backend.load().await?;
        debug!(days = history.len(), path = %backend.path().display(), "loaded history");
        Ok(Self {
            habits,
            history,
            backend,
            notifier,
        })
    }

    pub fn habits(&self) -> &HabitDefinition {
        &self.habits
    }

    pub fn history(&self) -> &HistoryMap {
        &self.history
    }

    /// Read-only lookup; never creates a record.
    pub fn get(&self, key: &DateKey) -> Option<&DayRecord> {
        self.history.get(key)
    }

    pub async fn get_or_create(&mut self, key: &DateKey) -> Result<DayRecord, CoreError> {
        if let Some(record) = self.history.get(key) {
            return Ok(record.clone());
        }
        self.commit(key, |_| Ok(())).await
    }

    pub async fn set_note(&mut self, key: &DateKey, note: String) -> Result<DayRecord, CoreError> {
        self.commit(key, move |record| {
            record.note = note;
            Ok(())
        })
        .await
    }

    pub async fn toggle_habit(
        &mut self,
        key: &DateKey,
        index: usize,
        value: bool,
    ) -> Result<DayRecord, CoreError> {
        self.habits.check_index(index)?;
        let habits = self.habits.clone();
        self.commit(key, move |record| {
            habits.check_vector(&record.habits)?;
            record.habits[index] = value;
            Ok(())
        })
        .await
    }

    pub async fn set_habits(&mut self, key: &DateKey, flags: Vec<bool>) -> Result<DayRecord, CoreError> {
        self.habits.check_vector(&flags)?;
        self.commit(key, move |record| {
            record.habits = flags;
            Ok(())
        })
        .await
    }

    /// Swaps in a whole history snapshot after checking every vector.
    pub async fn replace_history(&mut self, history: HistoryMap) -> Result<(), CoreError> {
        for (key, record) in &history.days {
            self.habits
                .check_vector(&record.habits)
                .map_err(|err| CoreError::validation(format!("{key}: {err}")))?;
        }

        let previous = std::mem::replace(&mut self.history, history);
        if let Err(err) = self.persist().await {
            self.history = previous;
            return Err(err);
        }
        self.notifier.emit(ChangeEvent::HistoryReplaced {
            days: self.history.len(),
        });
        Ok(())
    }

    /// Re-reads the backing file. On failure the in-memory history is kept.
    pub async fn load(&mut self) -> Result<&HistoryMap, CoreError> {
        self.history = self.backend.load().await?;
        Ok(&self.history)
    }

    pub async fn persist(&self) -> Result<(), CoreError> {
        self.backend.persist(&self.history).await
    }

    async fn commit<F>(&mut self, key: &DateKey, mutate: F) -> Result<DayRecord, CoreError>
    where
        F: FnOnce(&mut DayRecord) -> Result<(), CoreError>,
    {
        let previous = self.history.get(key).cloned();
        let mut record = previous
            .clone()
            .unwrap_or_else(|| DayRecord::empty(self.habits.len()));
        mutate(&mut record)?;

        self.history.days.insert(*key, record.clone());
        if let Err(err) = self.persist().await {
            match previous {
                Some(previous) => {
                    self.history.days.insert(*key, previous);
                }
                None => {
                    self.history.days.remove(key);
                }
            }
            return Err(err);
        }

        debug!(date = %key, "day record saved");
        self.notifier.emit(ChangeEvent::DayUpdated { date: *key });
        Ok(record)
    }
}
