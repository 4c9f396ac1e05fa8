//! Boundary to the text widget and the playback collaborator
//!
//! The widget hands every edit to [`EditorAdapter::apply_delta`], which
//! splices the content, updates the sync map and reports fresh breakpoint
//! hints for the gutter. Cursor movement and gutter clicks seek the video
//! through the narrow [`PlaybackControl`] trait; transport events coming
//! back from the player only ask the widget to take focus again.

use crate::error::SessionError;
use crate::events::SessionEvent;
use crate::handle::SessionHandle;
use std::sync::Arc;
use vnotes_doc::Delta;

/// The slice of a video player this core needs.
pub trait PlaybackControl: Send + Sync {
    /// Current playback position in seconds.
    fn position(&self) -> f64;
    /// Jump to a position in seconds.
    fn seek(&self, seconds: f64);
}

/// Transport events from the playback collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    Play,
    Pause,
    Seeked,
    RateChange,
}

/// Instruction back to the embedding widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterHint {
    /// Return keyboard focus to the text widget.
    FocusEditor,
}

/// Bridge between the editing widget, the playback collaborator and the
/// session.
pub struct EditorAdapter {
    handle: SessionHandle,
    playback: Option<Arc<dyn PlaybackControl>>,
    last_row: Option<u32>,
}

impl EditorAdapter {
    #[must_use]
    pub fn new(handle: SessionHandle) -> Self {
        Self {
            handle,
            playback: None,
            last_row: None,
        }
    }

    /// Attach the playback collaborator.
    #[must_use]
    pub fn with_playback(mut self, playback: Arc<dyn PlaybackControl>) -> Self {
        self.playback = Some(playback);
        self
    }

    /// Apply one edit event: splice the content, update the sync map and
    /// mark the document dirty. Returns the updated breakpoint lines for
    /// gutter rendering.
    ///
    /// A single-row edit that blanks its row unsyncs it; one that touches
    /// a previously unmapped row syncs it at the current playback
    /// position (or suppresses it when no video is attached). Multi-row
    /// edits renumber the map.
    ///
    /// # Errors
    /// [`SessionError::NoDocument`] before a document exists, and the
    /// delta/sync rejections for out-of-range positions.
    pub fn apply_delta(&self, delta: &Delta) -> Result<Vec<u32>, SessionError> {
        // Read the position before taking the session lock; the player is
        // foreign code.
        let position = self.playback.as_ref().map(|playback| playback.position());

        let mut session = self.handle.session().lock();
        let model = session.model_mut();
        let document = model.document_mut().ok_or(SessionError::NoDocument)?;

        document.content = delta.apply_to(&document.content)?;
        let line_count = document.line_count();
        let playback = if document.has_video() { position } else { None };
        let row_text = document
            .line(delta.start().row)
            .unwrap_or_default()
            .to_owned();
        document
            .sync_map
            .apply_delta(delta, &row_text, line_count, playback)?;
        let breakpoints = document.sync_map.breakpoint_lines();

        model.touch();
        tracing::debug!(
            row = delta.start().row,
            breakpoints = breakpoints.len(),
            "edit applied"
        );
        Ok(breakpoints)
    }

    /// The cursor landed on `row`. Seeks the video when the row is synced
    /// (and syncing is enabled); repeated notifications for the same row
    /// are ignored. Returns the position seeked to, if any.
    pub fn cursor_moved(&mut self, row: u32) -> Option<f64> {
        if self.last_row == Some(row) {
            return None;
        }
        self.last_row = Some(row);
        self.seek_synced_row(row)
    }

    /// The user clicked the gutter marker on `row`.
    pub fn gutter_clicked(&self, row: u32) -> Option<f64> {
        self.seek_synced_row(row)
    }

    /// A transport event arrived from the player; the only reaction is
    /// handing focus back to the text widget.
    pub fn playback_event(&self, event: PlaybackEvent) -> AdapterHint {
        tracing::debug!(?event, "playback event");
        AdapterHint::FocusEditor
    }

    /// Hint for a session broadcast: save/load announcements also hand
    /// focus back to the text widget, so typing continues uninterrupted.
    #[must_use]
    pub fn session_event_hint(&self, event: &SessionEvent) -> Option<AdapterHint> {
        match event {
            SessionEvent::Saving | SessionEvent::FirstSaving | SessionEvent::Loading => {
                Some(AdapterHint::FocusEditor)
            }
            _ => None,
        }
    }

    /// Toggle cursor-driven seeking for the whole document.
    pub fn set_sync_enabled(&self, enabled: bool) -> Result<(), SessionError> {
        let mut session = self.handle.session().lock();
        let model = session.model_mut();
        let document = model.document_mut().ok_or(SessionError::NoDocument)?;
        document.sync_map.set_enabled(enabled);
        model.touch();
        Ok(())
    }

    /// Current breakpoint lines for gutter rendering.
    #[must_use]
    pub fn breakpoints(&self) -> Vec<u32> {
        self.handle
            .session()
            .lock()
            .model()
            .document()
            .map(|document| document.sync_map.breakpoint_lines())
            .unwrap_or_default()
    }

    fn seek_synced_row(&self, row: u32) -> Option<f64> {
        let seconds = {
            let session = self.handle.session().lock();
            let document = session.model().document()?;
            if !document.sync_map.enabled() {
                return None;
            }
            document.sync_map.get(row)?.timestamp()?
        };
        let playback = self.playback.as_ref()?;
        tracing::debug!(row, seconds, "seeking to synced line");
        playback.seek(seconds);
        Some(seconds)
    }
}
