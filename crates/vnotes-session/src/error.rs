//! Error types for the editor session
//!
//! Two layers:
//! - [`BackendError`]: what the persistence backend can report
//! - [`SessionError`]: what session operations surface to callers,
//!   including contract violations (save/load while one is already in
//!   flight) and the terminal too-many-failures escalation

use vnotes_doc::{DeltaError, SyncMapError};

/// Failures reported by the persistence backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Transient transport failure; eligible for retry.
    #[error("network failure: {0}")]
    Network(String),

    /// Authorization denied; terminal for the session.
    #[error("not authorized to modify this document")]
    AuthDenied,

    /// Unknown document identifier.
    #[error("document not found: {0}")]
    NotFound(String),

    /// Backend-side failure.
    #[error("server error (status {status}): {message}")]
    Server { status: u16, message: String },
}

impl BackendError {
    /// Whether a retry can reasonably succeed.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Server { .. })
    }
}

/// Main session error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Save or load requested while one is already in flight. A caller
    /// bug, never retried by the session itself.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// No document has been created or loaded yet.
    #[error("no document in session")]
    NoDocument,

    /// Fifth consecutive save failure; the document is now read-only.
    #[error("too many save failures, editing disabled")]
    TooManyFailures,

    /// Backend failure, classified.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// Text-edit delta addressed a position outside the content.
    #[error("edit rejected: {0}")]
    Delta(#[from] DeltaError),

    /// Sync-map operation addressed a line outside the content.
    #[error("sync rejected: {0}")]
    SyncMap(#[from] SyncMapError),
}

impl SessionError {
    /// Whether the autosave scheduler or the user may simply try again.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend(error) if error.is_retryable())
    }

    /// Whether this error permanently disabled editing.
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::TooManyFailures | Self::Backend(BackendError::AuthDenied)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_retryability() {
        assert!(BackendError::Network("timeout".into()).is_retryable());
        assert!(BackendError::Server {
            status: 500,
            message: "oops".into()
        }
        .is_retryable());
        assert!(!BackendError::AuthDenied.is_retryable());
        assert!(!BackendError::NotFound("x".into()).is_retryable());
    }

    #[test]
    fn session_fatality() {
        assert!(SessionError::TooManyFailures.is_fatal());
        assert!(SessionError::Backend(BackendError::AuthDenied).is_fatal());
        assert!(!SessionError::Backend(BackendError::Network("t".into())).is_fatal());
        assert!(!SessionError::InvalidState("busy").is_fatal());
    }

    #[test]
    fn session_retryability() {
        assert!(SessionError::Backend(BackendError::Network("t".into())).is_retryable());
        assert!(!SessionError::InvalidState("busy").is_retryable());
        assert!(!SessionError::TooManyFailures.is_retryable());
    }
}
