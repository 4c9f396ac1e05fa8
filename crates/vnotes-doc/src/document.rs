//! The note document and its wire shape
//!
//! A [`Document`] is one note: text content, display metadata, the
//! attached video URL and the line/timestamp [`SyncMap`]. Serialization
//! matches the persistence wire shape (camelCase keys, `syncNotesVideo`
//! for the map, optional fields omitted when absent).

use crate::sync_map::SyncMap;
use serde::{Deserialize, Serialize};

/// Mime type of a persisted note.
pub const NOTES_MIME_TYPE: &str = "application/vnd.unishared.document";

/// Title given to a fresh, never-saved note.
pub const UNTITLED_TITLE: &str = "Untitled notes";

/// Per-document flags persisted alongside the note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Labels {
    pub starred: bool,
}

/// One note document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Backend identifier; absent until the first successful save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub content: String,
    pub editable: bool,
    pub labels: Labels,
    /// URL of the watched video, if one is attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(rename = "syncNotesVideo")]
    pub sync_map: SyncMap,
    pub mime_type: String,
    /// Parent folder identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl Document {
    /// A fresh, editable, empty note, optionally filed under a parent
    /// folder.
    #[must_use]
    pub fn untitled(parent: Option<String>) -> Self {
        Self {
            id: None,
            title: UNTITLED_TITLE.to_owned(),
            description: String::new(),
            content: String::new(),
            editable: true,
            labels: Labels::default(),
            video: None,
            sync_map: SyncMap::new(),
            mime_type: NOTES_MIME_TYPE.to_owned(),
            parent,
        }
    }

    /// Number of lines in the content. Empty content still has one line,
    /// matching how editing widgets count rows.
    #[must_use]
    pub fn line_count(&self) -> u32 {
        self.content.split('\n').count() as u32
    }

    /// Text of line `row`, if the document has one.
    #[must_use]
    pub fn line(&self, row: u32) -> Option<&str> {
        self.content.split('\n').nth(row as usize)
    }

    #[inline]
    #[must_use]
    pub fn has_video(&self) -> bool {
        self.video.is_some()
    }
}
