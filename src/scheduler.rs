use crate::clock::Clock;
use crate::date_key::{DateKey, today};
use crate::errors::CoreError;
use std::{future::Future, sync::Arc};
use tokio::{
    sync::{oneshot, watch},
    task::JoinHandle,
    time::sleep,
};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Armed,
    Firing,
}

pub struct RolloverScheduler {
    state: watch::Receiver<SchedulerState>,
    cancel: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl RolloverScheduler {
    /// Arms the scheduler for the midnight after `current`.
    pub fn spawn<F, Fut>(clock: Arc<dyn Clock>, current: DateKey, on_rollover: F) -> Self
    where
        F: Fn(DateKey) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CoreError>> + Send + 'static,
    {
        let (state_tx, state) = watch::channel(SchedulerState::Armed);
        let (cancel, mut cancelled) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut current = current;
            loop {
                let wait = clock.until_next_midnight();
                debug!(current = %current, wait_ms = wait.as_millis() as u64, "rollover armed");

                tokio::select! {
                    _ = &mut cancelled => {
                        debug!("rollover scheduler cancelled");
                        return;
                    }
                    _ = sleep(wait) => {}
                }

                let next = today(clock.as_ref());
                if next == current {
                    // woke before the boundary (clock adjusted); just re-arm
                    continue;
                }

                let _ = state_tx.send(SchedulerState::Firing);
                match tokio::spawn(on_rollover(next)).await {
                    Ok(Ok(())) => info!(date = %next, "rolled over to new day"),
                    Ok(Err(err)) => {
                        let err = CoreError::ScheduleCallback(err.to_string());
                        warn!(date = %next, "{err}");
                    }
                    Err(err) => warn!(date = %next, "rollover callback panicked: {err}"),
                }
                current = next;
                let _ = state_tx.send(SchedulerState::Armed);
            }
        });

        Self {
            state,
            cancel: Some(cancel),
            task,
        }
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    /// Clears the pending timer. A rollover already in progress finishes first.
    pub async fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        let _ = (&mut self.task).await;
    }
}
