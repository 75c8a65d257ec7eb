use crate::clock::Clock;
use crate::config::Config;
use crate::date_key::{DateKey, today};
use crate::debounce::NoteAutosaver;
use crate::errors::CoreError;
use crate::events::{ChangeEvent, Notifier};
use crate::models::CurrentDayContext;
use crate::scheduler::RolloverScheduler;
use crate::storage::JsonFile;
use crate::store::{DayStore, SharedStore};
use chrono::NaiveDateTime;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    /// Written only by [`AppState::roll_over`].
    current: Arc<RwLock<DateKey>>,
    pub clock: Arc<dyn Clock>,
    pub notifier: Notifier,
    pub autosaver: Arc<Mutex<NoteAutosaver>>,
    pub countdown_target: NaiveDateTime,
}

impl AppState {
    /// Fails when the data file exists but cannot be read, before anything
    /// is written back to it.
    pub async fn new(config: &Config) -> Result<Self, CoreError> {
        let clock = config.clock();
        let notifier = Notifier::new();
        let store = DayStore::open(
            JsonFile::new(&config.data_path),
            config.habits.clone(),
            notifier.clone(),
        )
        .await?;
        let store: SharedStore = Arc::new(Mutex::new(store));
        let autosaver = NoteAutosaver::new(config.note_debounce, store.clone(), notifier.clone());

        let current = today(clock.as_ref());
        if let Err(err) = store.lock().await.get_or_create(&current).await {
            warn!(date = %current, "could not create today's record: {err}");
        }
        info!(date = %current, path = %config.data_path.display(), "current day");

        Ok(Self {
            store,
            current: Arc::new(RwLock::new(current)),
            clock,
            notifier,
            autosaver: Arc::new(Mutex::new(autosaver)),
            countdown_target: config.countdown_target,
        })
    }

    pub async fn current_key(&self) -> DateKey {
        *self.current.read().await
    }

    pub async fn current_day(&self) -> Result<CurrentDayContext, CoreError> {
        let key = self.current_key().await;
        let record = self.store.lock().await.get_or_create(&key).await?;
        Ok(CurrentDayContext { key, record })
    }

    /// Moves "today" to `key`, creates its blank record and tells observers.
    ///
    /// The context moves even if the record cannot be persisted; it will be
    /// created on next access instead.
    pub async fn roll_over(&self, key: DateKey) -> Result<(), CoreError> {
        *self.current.write().await = key;
        let created = self.store.lock().await.get_or_create(&key).await.map(|_| ());
        self.notifier.emit(ChangeEvent::RolledOver { date: key });
        created
    }

    pub async fn spawn_scheduler(&self) -> RolloverScheduler {
        let state = self.clone();
        RolloverScheduler::spawn(self.clock.clone(), self.current_key().await, move |key| {
            let state = state.clone();
            async move { state.roll_over(key).await }
        })
    }
}
