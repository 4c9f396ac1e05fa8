//! Persistence backend contract
//!
//! The session talks to storage through [`BackendClient`] only; the
//! transport behind it (HTTP, disk, test double) is someone else's
//! concern. Saving a snapshot without an id creates a document, saving
//! one with an id updates it.

use crate::error::BackendError;
use async_trait::async_trait;
use serde::Deserialize;
use vnotes_doc::Document;

/// What the backend returns for a successful save or copy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SaveReceipt {
    /// Identifier of the persisted document (newly assigned on create).
    pub id: String,
}

/// Persistence operations consumed by the session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Fetch a document by id.
    async fn load(&self, id: &str) -> Result<Document, BackendError>;

    /// Persist a snapshot. `new_revision` asks the backend to record a
    /// distinct historical version instead of amending the latest one.
    async fn save(
        &self,
        snapshot: &Document,
        new_revision: bool,
    ) -> Result<SaveReceipt, BackendError>;

    /// Clone a template document, returning the copy's id.
    async fn copy_template(&self, template_id: &str) -> Result<SaveReceipt, BackendError>;
}
