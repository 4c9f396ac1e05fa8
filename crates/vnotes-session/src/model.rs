//! Document ownership and dirty tracking
//!
//! [`DocumentModel`] is the single owner of the session's [`Document`].
//! Change tracking is armed only after the document has completed its
//! first load or first save, so the initial population never counts as an
//! unsaved change. The dirty flag clears optimistically when a save
//! snapshot is taken and is re-set by a failed save.

use std::time::Duration;
use tokio::time::Instant;
use vnotes_doc::Document;

/// Owner of the current document plus its edit bookkeeping.
#[derive(Debug, Default)]
pub struct DocumentModel {
    document: Option<Document>,
    dirty: bool,
    track_changes: bool,
    last_save: Option<Instant>,
    generation: u64,
}

impl DocumentModel {
    /// Empty model; no document until [`DocumentModel::create`] or
    /// [`DocumentModel::replace`] runs.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Mutable access for the widget adapter. Callers that change content
    /// or the sync map follow up with [`DocumentModel::touch`].
    #[inline]
    pub fn document_mut(&mut self) -> Option<&mut Document> {
        self.document.as_mut()
    }

    /// Install a fresh document, superseding any previous one. Resets the
    /// dirty flag, disarms change tracking and bumps the generation so
    /// stale completions for the old document can be recognized.
    pub fn replace(&mut self, document: Document) {
        self.document = Some(document);
        self.dirty = false;
        self.track_changes = false;
        self.last_save = None;
        self.generation += 1;
    }

    /// Install a fresh, empty, editable note. The new note counts as
    /// dirty right away: it exists nowhere else yet.
    pub fn create(&mut self, parent: Option<String>) {
        self.replace(Document::untitled(parent));
        self.dirty = true;
    }

    /// Arm change tracking; called once the first load or first save
    /// round completes.
    pub fn arm_change_tracking(&mut self) {
        self.track_changes = true;
    }

    /// Record a mutation. Only marks dirty once tracking is armed and the
    /// document is editable.
    pub fn touch(&mut self) {
        if self.track_changes && self.editable() {
            self.dirty = true;
        }
    }

    /// Force the dirty flag, regardless of tracking state. Used when a
    /// save fails after the snapshot optimistically cleared it.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clone the document for a save attempt, optimistically clearing the
    /// dirty flag. `None` when no document exists.
    pub fn snapshot(&mut self) -> Option<Document> {
        let snapshot = self.document.clone()?;
        self.dirty = false;
        Some(snapshot)
    }

    /// Attach the backend-assigned identifier. Not a content mutation, so
    /// the dirty flag is untouched.
    pub fn assign_id(&mut self, id: String) {
        if let Some(document) = self.document.as_mut() {
            document.id = Some(id);
        }
    }

    /// Record the moment of a successful save.
    pub fn record_save_time(&mut self) {
        self.last_save = Some(Instant::now());
    }

    /// Age of the last successful save; `None` when this session has
    /// never saved the current document.
    #[must_use]
    pub fn time_since_last_save(&self) -> Option<Duration> {
        self.last_save.map(|at| at.elapsed())
    }

    /// Monotonic counter identifying which document is current.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// False when no document exists or editing has been disabled.
    #[must_use]
    pub fn editable(&self) -> bool {
        self.document.as_ref().is_some_and(|doc| doc.editable)
    }

    pub fn set_editable(&mut self, editable: bool) {
        if let Some(document) = self.document.as_mut() {
            document.editable = editable;
        }
    }
}
