//! Testing utilities for the vnotes workspace
//!
//! Shared fixtures and backend test doubles.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use uuid::Uuid;
use vnotes_doc::{Document, LineMark};
use vnotes_session::{BackendClient, BackendError, SaveReceipt};

/// A small note with a video attached and two synced lines.
pub fn sample_document() -> Document {
    let mut document = Document::untitled(None);
    document.title = "Lecture 3".to_owned();
    document.content = "intro\nkey point\nsummary".to_owned();
    document.video = Some("http://www.youtube.com/watch?v=U6FvJ6jMGHU".to_owned());
    document.sync_map.insert(0, LineMark::Timestamp(0.0));
    document.sync_map.insert(1, LineMark::Timestamp(40.0));
    document
}

/// Working backend over a HashMap: saves assign ids, loads serve stored
/// documents, copies clone templates. Counts calls so tests can assert
/// that the cache path skipped the network.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    documents: Mutex<HashMap<String, Document>>,
    save_calls: AtomicUsize,
    load_calls: AtomicUsize,
    save_delay: Option<Duration>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every save, so tests can observe the in-flight window.
    pub fn with_save_delay(mut self, delay: Duration) -> Self {
        self.save_delay = Some(delay);
        self
    }

    /// Pre-store a document under `id`.
    pub fn seed(&self, id: &str, mut document: Document) {
        document.id = Some(id.to_owned());
        self.documents.lock().insert(id.to_owned(), document);
    }

    pub fn stored(&self, id: &str) -> Option<Document> {
        self.documents.lock().get(id).cloned()
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackendClient for InMemoryBackend {
    async fn load(&self, id: &str) -> Result<Document, BackendError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        self.documents
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(id.to_owned()))
    }

    async fn save(
        &self,
        snapshot: &Document,
        _new_revision: bool,
    ) -> Result<SaveReceipt, BackendError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.save_delay {
            tokio::time::sleep(delay).await;
        }
        let id = snapshot
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut stored = snapshot.clone();
        stored.id = Some(id.clone());
        self.documents.lock().insert(id.clone(), stored);
        Ok(SaveReceipt { id })
    }

    async fn copy_template(&self, template_id: &str) -> Result<SaveReceipt, BackendError> {
        let template = self
            .documents
            .lock()
            .get(template_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(template_id.to_owned()))?;
        let id = Uuid::new_v4().to_string();
        let mut copy = template;
        copy.id = Some(id.clone());
        self.documents.lock().insert(id.clone(), copy);
        Ok(SaveReceipt { id })
    }
}

/// Backend whose saves fail with a scripted error sequence, then succeed.
/// Loads serve seeded documents so a session can still come up.
#[derive(Debug, Default)]
pub struct FlakyBackend {
    documents: Mutex<HashMap<String, Document>>,
    save_errors: Mutex<VecDeque<BackendError>>,
    save_calls: AtomicUsize,
}

impl FlakyBackend {
    pub fn failing_saves(errors: impl IntoIterator<Item = BackendError>) -> Self {
        Self {
            documents: Mutex::new(HashMap::new()),
            save_errors: Mutex::new(errors.into_iter().collect()),
            save_calls: AtomicUsize::new(0),
        }
    }

    /// `times` network failures before saves start succeeding.
    pub fn network_failures(times: usize) -> Self {
        Self::failing_saves(
            std::iter::repeat_with(|| BackendError::Network("connection reset".to_owned()))
                .take(times),
        )
    }

    /// Pre-store a loadable document under `id`.
    pub fn seed(&self, id: &str, mut document: Document) {
        document.id = Some(id.to_owned());
        self.documents.lock().insert(id.to_owned(), document);
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackendClient for FlakyBackend {
    async fn load(&self, id: &str) -> Result<Document, BackendError> {
        self.documents
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(id.to_owned()))
    }

    async fn save(
        &self,
        snapshot: &Document,
        _new_revision: bool,
    ) -> Result<SaveReceipt, BackendError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.save_errors.lock().pop_front() {
            return Err(error);
        }
        Ok(SaveReceipt {
            id: snapshot
                .id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
        })
    }

    async fn copy_template(&self, _template_id: &str) -> Result<SaveReceipt, BackendError> {
        Ok(SaveReceipt {
            id: Uuid::new_v4().to_string(),
        })
    }
}
