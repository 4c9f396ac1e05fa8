//! The editor session state machine
//!
//! [`EditorSession`] owns the [`DocumentModel`] and governs every
//! transition between clean, dirty, saving, loading and read-only. All
//! transitions run synchronously; network work happens between a
//! `begin_*` call and its matching `complete_*` call, driven by
//! [`SessionHandle`](crate::handle::SessionHandle). Overlapping saves or
//! loads are rejected as caller errors rather than queued.
//!
//! Failure escalation: reaching the consecutive-failure limit, or a
//! single authorization denial, permanently disables editing for the
//! session. Read-only is sticky; only an explicit
//! [`EditorSession::set_editable`] re-enables.

use crate::config::SessionConfig;
use crate::error::{BackendError, SessionError};
use crate::events::{ErrorAction, EventBus, SessionEvent};
use crate::model::DocumentModel;
use vnotes_doc::Document;

/// Externally observable session state; exactly one holds at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    /// No unsaved changes, document editable.
    Clean,
    /// Unsaved changes awaiting a save.
    Dirty,
    /// A save is in flight.
    Saving,
    /// A load is in flight.
    Loading,
    /// Editing permanently disabled for this session.
    ReadOnly,
}

/// One save attempt: the snapshot taken when it began, plus what the
/// completion handler needs to apply the result safely.
#[derive(Debug, Clone)]
pub struct SaveSession {
    /// Document content and metadata at the moment the save began.
    pub snapshot: Document,
    /// Whether the backend should record a distinct revision.
    pub new_revision: bool,
    /// Which document the snapshot belongs to; completions for a
    /// superseded document are discarded.
    pub(crate) generation: u64,
}

/// How [`EditorSession::begin_load`] wants the load carried out.
#[derive(Debug, Clone)]
pub enum LoadStart {
    /// The requested document is already in memory; no network call.
    Cached(Document),
    /// Fetch from the backend.
    Fetch(String),
}

/// Result of a completed save attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// The save applied; carries the up-to-date document.
    Saved(Document),
    /// The document was replaced while the save was in flight; the result
    /// was discarded.
    Stale,
}

/// The session state machine.
#[derive(Debug)]
pub struct EditorSession {
    config: SessionConfig,
    events: EventBus,
    model: DocumentModel,
    saving: bool,
    loading: bool,
    save_failures: u32,
}

impl EditorSession {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let events = EventBus::new(config.event_capacity);
        Self {
            config,
            events,
            model: DocumentModel::new(),
            saving: false,
            loading: false,
            save_failures: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn model(&self) -> &DocumentModel {
        &self.model
    }

    #[inline]
    pub fn model_mut(&mut self) -> &mut DocumentModel {
        &mut self.model
    }

    /// Current state. Transport states win over dirty tracking, and a
    /// non-editable document reads as [`EditState::ReadOnly`].
    #[must_use]
    pub fn state(&self) -> EditState {
        if self.loading {
            EditState::Loading
        } else if self.saving {
            EditState::Saving
        } else if self.model.document().is_some() && !self.model.editable() {
            EditState::ReadOnly
        } else if self.model.is_dirty() {
            EditState::Dirty
        } else {
            EditState::Clean
        }
    }

    /// Install a fresh, empty note.
    pub fn create(&mut self, parent: Option<String>) {
        tracing::info!(?parent, "creating new note");
        self.model.create(parent);
    }

    /// Whether tearing down the session would lose edits. The embedding
    /// layer gates its leave-confirmation on this.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.model.is_dirty() && self.model.editable()
    }

    /// Explicitly re-enable (or disable) editing. Re-enabling forgives
    /// the failure streak that disabled it.
    pub fn set_editable(&mut self, editable: bool) {
        self.model.set_editable(editable);
        if editable {
            self.save_failures = 0;
        }
    }

    /// Start a load, or serve the in-memory document when `reload` is
    /// false and the id matches the current one.
    ///
    /// # Errors
    /// [`SessionError::InvalidState`] when a load is already in flight.
    pub fn begin_load(&mut self, id: &str, reload: bool) -> Result<LoadStart, SessionError> {
        if self.loading {
            return Err(SessionError::InvalidState(
                "load requested while another load is in flight",
            ));
        }
        if !reload {
            if let Some(document) = self.model.document() {
                if document.id.as_deref() == Some(id) {
                    tracing::info!(id, "serving document from memory");
                    return Ok(LoadStart::Cached(document.clone()));
                }
            }
        }

        self.loading = true;
        tracing::info!(id, "loading document");
        self.events.emit(SessionEvent::Loading);
        Ok(LoadStart::Fetch(id.to_owned()))
    }

    /// Apply a load result. Success replaces the document and arms change
    /// tracking; failure leaves whatever was there before intact.
    pub fn complete_load(
        &mut self,
        id: &str,
        result: Result<Document, BackendError>,
    ) -> Result<Document, SessionError> {
        self.loading = false;
        match result {
            Ok(mut document) => {
                document.id = Some(id.to_owned());
                self.model.replace(document.clone());
                self.model.arm_change_tracking();
                tracing::info!(id, "document loaded");
                self.events.emit(SessionEvent::Loaded(document.clone()));
                Ok(document)
            }
            Err(error) => {
                tracing::warn!(id, %error, "load failed");
                self.events.emit(SessionEvent::Error {
                    action: ErrorAction::Load,
                    message: "An error occurred while loading the file".to_owned(),
                });
                Err(SessionError::Backend(error))
            }
        }
    }

    /// Start a save attempt: snapshot the document (optimistically
    /// clearing the dirty flag) and announce it.
    ///
    /// A revision is forced when the caller asks for one, when the
    /// session has never saved this document, or when the last successful
    /// save is older than the configured threshold.
    ///
    /// # Errors
    /// [`SessionError::InvalidState`] when a save or load is in flight;
    /// [`SessionError::NoDocument`] before any document exists.
    pub fn begin_save(&mut self, force_new_revision: bool) -> Result<SaveSession, SessionError> {
        if self.saving || self.loading {
            return Err(SessionError::InvalidState(
                "save requested while a save or load is in flight",
            ));
        }
        let snapshot = self.model.snapshot().ok_or(SessionError::NoDocument)?;
        self.saving = true;

        if snapshot.id.is_none() {
            tracing::info!("saving document for the first time");
            self.events.emit(SessionEvent::FirstSaving);
        } else {
            tracing::info!(id = snapshot.id.as_deref(), "saving document");
            self.events.emit(SessionEvent::Saving);
        }

        let new_revision = force_new_revision
            || self
                .model
                .time_since_last_save()
                .map_or(true, |age| age > self.config.max_revision_age);

        Ok(SaveSession {
            snapshot,
            new_revision,
            generation: self.model.generation(),
        })
    }

    /// Apply a save result.
    ///
    /// A completion for a document that has since been replaced by a load
    /// is discarded ([`SaveOutcome::Stale`]) so it cannot overwrite the
    /// newer document. Failures re-dirty the model and escalate: the
    /// consecutive-failure limit or an authorization denial disables
    /// editing permanently.
    pub fn complete_save(
        &mut self,
        save: SaveSession,
        result: Result<crate::backend::SaveReceipt, BackendError>,
    ) -> Result<SaveOutcome, SessionError> {
        self.saving = false;

        if save.generation != self.model.generation() {
            tracing::debug!("discarding save completion for a superseded document");
            return Ok(SaveOutcome::Stale);
        }

        match result {
            Ok(receipt) => {
                self.save_failures = 0;
                let first_save = self
                    .model
                    .document()
                    .is_some_and(|document| document.id.is_none());
                if first_save {
                    self.model.assign_id(receipt.id.clone());
                    self.events.emit(SessionEvent::FirstSaved(receipt.id.clone()));
                }
                self.model.record_save_time();
                self.model.arm_change_tracking();

                let document = self
                    .model
                    .document()
                    .cloned()
                    .ok_or(SessionError::NoDocument)?;
                tracing::info!(id = %receipt.id, "document saved");
                self.events.emit(SessionEvent::Saved(document.clone()));
                Ok(SaveOutcome::Saved(document))
            }
            Err(error) => {
                self.save_failures += 1;
                self.model.mark_dirty();

                if self.save_failures >= self.config.max_save_failures {
                    self.model.set_editable(false);
                    tracing::error!(
                        failures = self.save_failures,
                        "too many save failures, editing disabled"
                    );
                    self.events.emit(SessionEvent::Error {
                        action: ErrorAction::Save,
                        message: "Too many errors occurred while saving the file. \
                                  Please contact us"
                            .to_owned(),
                    });
                    Err(SessionError::TooManyFailures)
                } else if error == BackendError::AuthDenied {
                    self.model.set_editable(false);
                    tracing::error!("not authorized to save, editing disabled");
                    self.events.emit(SessionEvent::Error {
                        action: ErrorAction::Save,
                        message: "You are not authorized to save or update this file. \
                                  Please contact us"
                            .to_owned(),
                    });
                    Err(SessionError::Backend(error))
                } else {
                    tracing::warn!(failures = self.save_failures, %error, "save failed");
                    self.events.emit(SessionEvent::Error {
                        action: ErrorAction::Save,
                        message: "An error occurred while saving the file".to_owned(),
                    });
                    Err(SessionError::Backend(error))
                }
            }
        }
    }

    /// Apply a template-copy result: success attaches the copy's id to
    /// the current document.
    pub fn complete_copy(
        &mut self,
        template_id: &str,
        result: Result<crate::backend::SaveReceipt, BackendError>,
    ) -> Result<String, SessionError> {
        match result {
            Ok(receipt) => {
                self.model.assign_id(receipt.id.clone());
                tracing::info!(template_id, id = %receipt.id, "template copied");
                self.events.emit(SessionEvent::Copied(receipt.id.clone()));
                Ok(receipt.id)
            }
            Err(error) => {
                tracing::warn!(template_id, %error, "template copy failed");
                self.events.emit(SessionEvent::Error {
                    action: ErrorAction::Copy,
                    message: "An error occurred while copying the template".to_owned(),
                });
                Err(SessionError::Backend(error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SaveReceipt;

    fn session() -> EditorSession {
        EditorSession::new(SessionConfig::new())
    }

    fn receipt(id: &str) -> Result<SaveReceipt, BackendError> {
        Ok(SaveReceipt { id: id.into() })
    }

    fn network_error() -> Result<SaveReceipt, BackendError> {
        Err(BackendError::Network("connection reset".into()))
    }

    #[test]
    fn fresh_session_is_clean() {
        assert_eq!(session().state(), EditState::Clean);
    }

    #[test]
    fn create_makes_session_dirty() {
        let mut session = session();
        session.create(None);
        assert_eq!(session.state(), EditState::Dirty);
        assert!(session.has_unsaved_changes());
    }

    #[test]
    fn save_without_document_is_rejected() {
        let mut session = session();
        assert!(matches!(
            session.begin_save(false),
            Err(SessionError::NoDocument)
        ));
        assert_eq!(session.state(), EditState::Clean);
    }

    #[tokio::test]
    async fn first_save_assigns_id_and_emits_first_saved() {
        let mut session = session();
        let mut events = session.events().subscribe();
        session.create(None);

        let save = session.begin_save(false).unwrap();
        assert_eq!(session.state(), EditState::Saving);
        assert!(save.new_revision, "first save of a session forces a revision");
        assert_eq!(save.snapshot.id, None);

        let outcome = session.complete_save(save, receipt("doc-1")).unwrap();
        let SaveOutcome::Saved(document) = outcome else {
            panic!("expected applied save");
        };
        assert_eq!(document.id.as_deref(), Some("doc-1"));
        assert_eq!(session.state(), EditState::Clean);

        assert_eq!(events.recv().await.unwrap(), SessionEvent::FirstSaving);
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::FirstSaved("doc-1".into())
        );
        assert!(matches!(
            events.recv().await.unwrap(),
            SessionEvent::Saved(_)
        ));
    }

    #[test]
    fn save_while_saving_is_invalid_and_leaves_state() {
        let mut session = session();
        session.create(None);
        let _inflight = session.begin_save(false).unwrap();

        let result = session.begin_save(false);
        assert!(matches!(result, Err(SessionError::InvalidState(_))));
        assert_eq!(session.state(), EditState::Saving);
    }

    #[test]
    fn save_while_loading_is_invalid() {
        let mut session = session();
        session.create(None);
        session.model_mut().assign_id("doc-1".into());
        let _load = session.begin_load("doc-2", false).unwrap();

        assert!(matches!(
            session.begin_save(false),
            Err(SessionError::InvalidState(_))
        ));
        assert_eq!(session.state(), EditState::Loading);
    }

    #[test]
    fn failed_save_re_dirties_and_stays_retryable() {
        let mut session = session();
        session.create(None);

        let save = session.begin_save(false).unwrap();
        assert!(!session.model().is_dirty(), "snapshot clears dirty");

        let err = session.complete_save(save, network_error()).unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(session.state(), EditState::Dirty);
    }

    #[test]
    fn fifth_consecutive_failure_disables_editing() {
        let mut session = session();
        session.create(None);

        for attempt in 1..=5u32 {
            let save = session.begin_save(false).unwrap();
            let err = session.complete_save(save, network_error()).unwrap_err();
            if attempt < 5 {
                assert_eq!(session.state(), EditState::Dirty, "attempt {attempt}");
            } else {
                assert_eq!(err, SessionError::TooManyFailures);
                assert_eq!(session.state(), EditState::ReadOnly);
            }
        }
    }

    #[test]
    fn success_resets_the_failure_streak() {
        let mut session = session();
        session.create(None);

        for _ in 0..4 {
            let save = session.begin_save(false).unwrap();
            let _ = session.complete_save(save, network_error());
        }
        let save = session.begin_save(false).unwrap();
        session.complete_save(save, receipt("doc-1")).unwrap();

        // Four more failures only reach a streak of four.
        session.model_mut().mark_dirty();
        for _ in 0..4 {
            let save = session.begin_save(false).unwrap();
            let _ = session.complete_save(save, network_error());
        }
        assert_eq!(session.state(), EditState::Dirty);
    }

    #[test]
    fn auth_denied_disables_editing_on_first_failure() {
        let mut session = session();
        session.create(None);

        let save = session.begin_save(false).unwrap();
        let err = session
            .complete_save(save, Err(BackendError::AuthDenied))
            .unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(session.state(), EditState::ReadOnly);
    }

    #[test]
    fn read_only_is_sticky_until_explicit_re_enable() {
        let mut session = session();
        session.create(None);
        let save = session.begin_save(false).unwrap();
        let _ = session.complete_save(save, Err(BackendError::AuthDenied));
        assert_eq!(session.state(), EditState::ReadOnly);

        session.set_editable(true);
        assert_eq!(session.state(), EditState::Dirty);
    }

    #[test]
    fn cached_load_skips_the_backend() {
        let mut session = session();
        session.create(None);
        session.model_mut().assign_id("doc-1".into());

        let start = session.begin_load("doc-1", false).unwrap();
        assert!(matches!(start, LoadStart::Cached(_)));
        assert_eq!(session.state(), EditState::Dirty);
    }

    #[test]
    fn reload_bypasses_the_cache() {
        let mut session = session();
        session.create(None);
        session.model_mut().assign_id("doc-1".into());

        let start = session.begin_load("doc-1", true).unwrap();
        assert!(matches!(start, LoadStart::Fetch(_)));
    }

    #[test]
    fn load_failure_keeps_prior_document() {
        let mut session = session();
        session.create(None);
        session.model_mut().assign_id("doc-1".into());
        let generation = session.model().generation();

        let _start = session.begin_load("doc-2", false).unwrap();
        let err = session
            .complete_load("doc-2", Err(BackendError::NotFound("doc-2".into())))
            .unwrap_err();
        assert_eq!(
            err,
            SessionError::Backend(BackendError::NotFound("doc-2".into()))
        );
        assert_eq!(session.model().generation(), generation);
        assert_eq!(
            session.model().document().unwrap().id.as_deref(),
            Some("doc-1")
        );
    }

    #[test]
    fn load_while_loading_is_invalid() {
        let mut session = session();
        let _start = session.begin_load("doc-1", false).unwrap();
        assert!(matches!(
            session.begin_load("doc-2", false),
            Err(SessionError::InvalidState(_))
        ));
    }

    #[test]
    fn stale_save_completion_is_discarded() {
        let mut session = session();
        session.create(None);
        let save = session.begin_save(false).unwrap();

        // A load supersedes the document while the save is in flight.
        let mut other = Document::untitled(None);
        other.content = "newer".into();
        let _start = session.begin_load("doc-2", false).unwrap();
        session.complete_load("doc-2", Ok(other)).unwrap();

        let outcome = session.complete_save(save, receipt("doc-1")).unwrap();
        assert_eq!(outcome, SaveOutcome::Stale);
        let current = session.model().document().unwrap();
        assert_eq!(current.id.as_deref(), Some("doc-2"));
        assert_eq!(current.content, "newer");
    }

    #[tokio::test(start_paused = true)]
    async fn old_save_forces_a_new_revision() {
        let mut session = session();
        session.create(None);

        let save = session.begin_save(false).unwrap();
        session.complete_save(save, receipt("doc-1")).unwrap();

        session.model_mut().mark_dirty();
        let save = session.begin_save(false).unwrap();
        assert!(!save.new_revision, "recent save amends the latest revision");
        session.complete_save(save, receipt("doc-1")).unwrap();

        tokio::time::advance(std::time::Duration::from_secs(2 * 60 * 60)).await;
        session.model_mut().mark_dirty();
        let save = session.begin_save(false).unwrap();
        assert!(save.new_revision, "stale save records a new revision");
    }

    #[test]
    fn copy_attaches_the_new_id() {
        let mut session = session();
        session.create(None);
        let id = session
            .complete_copy("template-1", receipt("copy-9"))
            .unwrap();
        assert_eq!(id, "copy-9");
        assert_eq!(
            session.model().document().unwrap().id.as_deref(),
            Some("copy-9")
        );
    }

    #[test]
    fn copy_failure_is_surfaced() {
        let mut session = session();
        session.create(None);
        let err = session
            .complete_copy("template-1", Err(BackendError::Network("down".into())))
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(session.model().document().unwrap().id, None);
    }
}
