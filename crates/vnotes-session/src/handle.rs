//! Async facade over the session state machine
//!
//! [`SessionHandle`] pairs the synchronous [`EditorSession`] with the
//! [`BackendClient`] and drives each operation as
//! begin-transition, await transport, complete-transition. The session
//! lock is never held across an await, so edits keep flowing while a
//! save or load is in flight.

use crate::backend::BackendClient;
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::events::SessionEvent;
use crate::session::{EditState, EditorSession, LoadStart, SaveOutcome};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use vnotes_doc::Document;

/// Cloneable handle to one editor session.
#[derive(Clone)]
pub struct SessionHandle {
    session: Arc<Mutex<EditorSession>>,
    backend: Arc<dyn BackendClient>,
}

impl SessionHandle {
    #[must_use]
    pub fn new(config: SessionConfig, backend: Arc<dyn BackendClient>) -> Self {
        Self {
            session: Arc::new(Mutex::new(EditorSession::new(config))),
            backend,
        }
    }

    pub(crate) fn session(&self) -> &Arc<Mutex<EditorSession>> {
        &self.session
    }

    /// Subscribe to session events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.session.lock().events().subscribe()
    }

    #[must_use]
    pub fn state(&self) -> EditState {
        self.session.lock().state()
    }

    /// Clone of the current document, if one exists.
    #[must_use]
    pub fn document(&self) -> Option<Document> {
        self.session.lock().model().document().cloned()
    }

    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.session.lock().has_unsaved_changes()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.session.lock().model().generation()
    }

    #[must_use]
    pub fn autosave_interval(&self) -> Duration {
        self.session.lock().config().autosave_interval
    }

    /// Install a fresh, empty note.
    pub fn create(&self, parent: Option<String>) {
        self.session.lock().create(parent);
    }

    /// Explicitly re-enable (or disable) editing.
    pub fn set_editable(&self, editable: bool) {
        self.session.lock().set_editable(editable);
    }

    /// Save the current document.
    ///
    /// # Errors
    /// Propagates [`SessionError::InvalidState`] for overlapping calls,
    /// [`SessionError::NoDocument`] before a document exists, and the
    /// classified backend failures (which also escalate inside the
    /// session).
    pub async fn save(&self, force_new_revision: bool) -> Result<SaveOutcome, SessionError> {
        let save = self.session.lock().begin_save(force_new_revision)?;
        let result = self
            .backend
            .save(&save.snapshot, save.new_revision)
            .await;
        self.session.lock().complete_save(save, result)
    }

    /// Load a document, serving it from memory when `reload` is false and
    /// the id matches the current document.
    pub async fn load(&self, id: &str, reload: bool) -> Result<Document, SessionError> {
        let id = match self.session.lock().begin_load(id, reload)? {
            LoadStart::Cached(document) => return Ok(document),
            LoadStart::Fetch(id) => id,
        };
        let result = self.backend.load(&id).await;
        self.session.lock().complete_load(&id, result)
    }

    /// Copy a template document and attach the copy's id to the current
    /// document.
    pub async fn copy(&self, template_id: &str) -> Result<String, SessionError> {
        tracing::info!(template_id, "copying template");
        let result = self.backend.copy_template(template_id).await;
        self.session.lock().complete_copy(template_id, result)
    }
}
