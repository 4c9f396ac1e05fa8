//! VideoNotes editor session
//!
//! Orchestration for one note-editing session:
//! - Owns the document and its dirty tracking ([`DocumentModel`])
//! - Governs clean/dirty/saving/loading/read-only transitions with
//!   failure escalation ([`EditorSession`], driven by [`SessionHandle`])
//! - Schedules background saves ([`AutosaveScheduler`])
//! - Bridges the text widget and the video player ([`EditorAdapter`])
//! - Talks to persistence through the [`BackendClient`] seam and
//!   broadcasts typed [`SessionEvent`]s to collaborators
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vnotes_session::{AutosaveScheduler, SessionConfig, SessionHandle};
//!
//! # async fn example(backend: Arc<dyn vnotes_session::BackendClient>) {
//! let handle = SessionHandle::new(SessionConfig::new(), backend);
//! handle.create(None);
//! AutosaveScheduler::new(&handle).spawn(handle.clone());
//!
//! handle.save(false).await.unwrap();
//! # }
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod adapter;
pub mod autosave;
pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod handle;
pub mod model;
pub mod session;

// Re-exports for convenience
pub use adapter::{AdapterHint, EditorAdapter, PlaybackControl, PlaybackEvent};
pub use autosave::AutosaveScheduler;
pub use backend::{BackendClient, SaveReceipt};
pub use config::SessionConfig;
pub use error::{BackendError, SessionError};
pub use events::{ErrorAction, EventBus, SessionEvent};
pub use handle::SessionHandle;
pub use model::DocumentModel;
pub use session::{EditState, EditorSession, LoadStart, SaveOutcome, SaveSession};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with an editor session
    pub use crate::{
        AutosaveScheduler, BackendClient, EditState, EditorAdapter, SessionConfig, SessionEvent,
        SessionHandle,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
