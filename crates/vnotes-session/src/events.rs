//! Typed session events
//!
//! Cross-component notification is explicit message passing over a
//! broadcast channel: the session emits [`SessionEvent`]s, collaborators
//! (UI, playback, the autosave scheduler) subscribe and react. Emitting
//! with no subscribers is fine; slow subscribers may observe a lag.

use tokio::sync::broadcast;
use vnotes_doc::Document;

/// Which operation an [`SessionEvent::Error`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorAction {
    Load,
    Save,
    Copy,
}

impl std::fmt::Display for ErrorAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorAction::Load => "load",
            ErrorAction::Save => "save",
            ErrorAction::Copy => "copy",
        };
        f.write_str(name)
    }
}

/// Events broadcast to session collaborators.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A document load started.
    Loading,
    /// A document load finished; carries the fresh document.
    Loaded(Document),
    /// A save of an already-persisted document started.
    Saving,
    /// The very first save of a new document started.
    FirstSaving,
    /// A save finished; carries the saved document.
    Saved(Document),
    /// The very first save finished; carries the assigned identifier.
    FirstSaved(String),
    /// A template copy finished; carries the new identifier.
    Copied(String),
    /// An operation failed; `message` is user-presentable.
    Error {
        action: ErrorAction,
        message: String,
    },
}

/// Broadcast bus for [`SessionEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// New subscription; receives every event emitted from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Emit to all current subscribers.
    pub fn emit(&self, event: SessionEvent) {
        tracing::debug!(?event, "session event");
        // No subscribers is not an error.
        let _ = self.tx.send(event);
    }
}
