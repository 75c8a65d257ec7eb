use crate::date_key::DateKey;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    DayUpdated { date: DateKey },
    RolledOver { date: DateKey },
    HistoryReplaced { days: usize },
    SaveFailed { date: DateKey, message: String },
}

impl ChangeEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DayUpdated { .. } => "day_updated",
            Self::RolledOver { .. } => "rolled_over",
            Self::HistoryReplaced { .. } => "history_replaced",
            Self::SaveFailed { .. } => "save_failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notifier {
    sender: broadcast::Sender<ChangeEvent>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn emit(&self, event: ChangeEvent) {
        trace!(event = ?event, "emitting change event");
        // no subscribers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
