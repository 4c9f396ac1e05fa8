//! VideoNotes document layer
//!
//! Pure data types for video-synchronized notes:
//!
//! - [`Document`]: one note with content, metadata and attached video
//! - [`SyncMap`]: the line/timestamp synchronization map and its update
//!   algorithm under text-edit deltas
//! - [`Delta`]: a single edit event from the text widget, with content
//!   splicing and shift-point derivation
//! - [`VideoSource`]: recognition of YouTube/Coursera video URLs
//!
//! # Example
//!
//! ```rust,ignore
//! use vnotes_doc::{Delta, Document, Position};
//!
//! let mut doc = Document::untitled(None);
//! doc.content = "intro".into();
//! doc.sync_map.sync_line(0, doc.line_count(), Some(12.5))?;
//!
//! let delta = Delta::Insert {
//!     start: Position::new(0, 0),
//!     lines: vec!["title".into(), "".into()],
//! };
//! doc.content = delta.apply_to(&doc.content)?;
//! doc.sync_map.apply_shift(&delta);
//! ```

#![warn(unreachable_pub)]

// Core modules
mod delta;
mod document;
mod error;
mod sync_map;
mod video;

// Re-exports
pub use delta::{Delta, Position, RowShift};
pub use document::{Document, Labels, NOTES_MIME_TYPE, UNTITLED_TITLE};
pub use error::{DeltaError, SyncMapError};
pub use sync_map::{LineMark, SyncMap, SUPPRESSED_SENTINEL};
pub use video::{youtube_video_id, CourseraLecture, VideoSource};
