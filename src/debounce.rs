use crate::date_key::DateKey;
use crate::events::{ChangeEvent, Notifier};
use crate::store::SharedStore;
use std::{future::Future, time::Duration};
use tokio::{sync::oneshot, task::JoinHandle, time::sleep};
use tracing::{debug, error};

enum Signal {
    Cancel,
    FireNow,
}

struct Pending {
    signal: oneshot::Sender<Signal>,
    task: JoinHandle<()>,
}

/// Holds at most one pending job. Scheduling a new job drops the previous
/// one if its delay has not elapsed yet.
pub struct Debouncer {
    delay: Duration,
    pending: Option<Pending>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn schedule<F>(&mut self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let (signal, rx) = oneshot::channel();
        let delay = self.delay;
        let task = tokio::spawn(async move {
            let run = tokio::select! {
                _ = sleep(delay) => true,
                signal = rx => matches!(signal, Ok(Signal::FireNow)),
            };
            if run {
                job.await;
            }
        });
        self.pending = Some(Pending { signal, task });
    }

    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            let _ = pending.signal.send(Signal::Cancel);
        }
    }

    /// Runs the pending job now, if any, and waits for it.
    pub async fn flush(&mut self) {
        if let Some(pending) = self.pending.take() {
            let _ = pending.signal.send(Signal::FireNow);
            if let Err(err) = pending.task.await {
                error!("debounced job failed: {err}");
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|pending| !pending.task.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Collapses bursts of note edits into a single save per quiet window.
pub struct NoteAutosaver {
    debouncer: Debouncer,
    pending_date: Option<DateKey>,
    store: SharedStore,
    notifier: Notifier,
}

impl NoteAutosaver {
    pub fn new(delay: Duration, store: SharedStore, notifier: Notifier) -> Self {
        Self {
            debouncer: Debouncer::new(delay),
            pending_date: None,
            store,
            notifier,
        }
    }

    pub async fn submit(&mut self, date: DateKey, note: String) {
        // a draft for another day must not be dropped by this one
        if self.pending_date.is_some_and(|pending| pending != date) {
            self.debouncer.flush().await;
        }
        self.pending_date = Some(date);

        let store = self.store.clone();
        let notifier = self.notifier.clone();
        self.debouncer.schedule(async move {
            let result = store.lock().await.set_note(&date, note).await;
            match result {
                Ok(_) => debug!(date = %date, "autosaved note"),
                Err(err) => {
                    error!(date = %date, "note autosave failed: {err}");
                    notifier.emit(ChangeEvent::SaveFailed {
                        date,
                        message: err.to_string(),
                    });
                }
            }
        });
    }

    pub async fn flush(&mut self) {
        self.debouncer.flush().await;
        self.pending_date = None;
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}
