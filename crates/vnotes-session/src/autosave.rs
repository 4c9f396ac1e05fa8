//! Background autosave
//!
//! One repeating timer per loaded document. The timer arms only once the
//! document is live (first load or first save finished) and re-arms after
//! each cycle's save completes, so ticks never overlap. It stops
//! permanently when editing is disabled or when a new load replaces the
//! document; the embedding layer spawns a fresh scheduler alongside the
//! new load.

use crate::events::SessionEvent;
use crate::handle::SessionHandle;
use crate::session::EditState;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Periodic dirty-check driving background saves.
#[derive(Debug)]
pub struct AutosaveScheduler {
    interval: Duration,
}

impl AutosaveScheduler {
    /// Scheduler using the session's configured interval.
    #[must_use]
    pub fn new(handle: &SessionHandle) -> Self {
        Self {
            interval: handle.autosave_interval(),
        }
    }

    /// Scheduler with an explicit interval.
    #[must_use]
    pub fn with_interval(interval: Duration) -> Self {
        Self { interval }
    }

    /// Spawn the scheduler onto the runtime.
    pub fn spawn(self, handle: SessionHandle) -> JoinHandle<()> {
        tokio::spawn(self.run(handle))
    }

    /// Run until the document leaves this scheduler's care.
    pub async fn run(self, handle: SessionHandle) {
        let mut events = handle.subscribe();
        // Wait for a live document before arming the timer.
        loop {
            match events.recv().await {
                Ok(SessionEvent::Loaded(_) | SessionEvent::FirstSaved(_)) => break,
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => {
                    tracing::debug!(missed, "autosave missed events while arming");
                }
                Err(RecvError::Closed) => return,
            }
        }
        drop(events);

        let generation = handle.generation();
        tracing::debug!(generation, interval = ?self.interval, "autosave armed");

        loop {
            sleep(self.interval).await;

            if handle.generation() != generation {
                tracing::debug!("document replaced, autosave stopped");
                return;
            }
            match handle.state() {
                EditState::ReadOnly => {
                    tracing::debug!("editing disabled, autosave stopped");
                    return;
                }
                EditState::Dirty => {
                    // Failures already surface on the event bus; the next
                    // tick re-evaluates.
                    if let Err(error) = handle.save(false).await {
                        tracing::debug!(%error, "autosave attempt failed");
                    }
                }
                EditState::Clean | EditState::Saving | EditState::Loading => {}
            }
        }
    }
}
