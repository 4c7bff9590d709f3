//! Seams between the endpoints and their collaborators.

use async_trait::async_trait;

use crate::document::{Collection, Document, DocumentQuery, DocumentWrite};

/// Persistence gateway over a document store.
///
/// Endpoints receive this as an injected `Arc<dyn DocumentStore<Error = ...>>`
/// so tests can substitute the in-memory backend. Document-level atomicity is
/// the backend's responsibility; [`DocumentStore::allocate`] is the only
/// cross-call atomic primitive.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    type Error;

    /// Creates a document with backend-assigned id, resolving server-time
    /// markers, and returns the new id.
    async fn create(
        &self,
        collection: Collection,
        write: DocumentWrite,
    ) -> Result<String, Self::Error>;

    async fn read(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, Self::Error>;

    /// Updates the named fields in place, leaving others untouched. Fails if
    /// the document does not exist.
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        write: DocumentWrite,
    ) -> Result<(), Self::Error>;

    async fn query(
        &self,
        collection: Collection,
        query: DocumentQuery,
    ) -> Result<Vec<Document>, Self::Error>;

    /// Atomically raises the named counter to at least `floor` and increments
    /// it by one, returning the new value. Two concurrent callers always
    /// observe distinct results; this is what keeps timeline numbers unique
    /// under concurrent creation.
    async fn allocate(&self, counter: &str, floor: i64) -> Result<i64, Self::Error>;
}

/// AI assistance for note authoring. The model call itself is an external
/// collaborator; implementations wrap a hosted model or a canned mock.
#[async_trait]
pub trait NoteAssistant: Send + Sync {
    type Error;

    /// Generates a short title for the given note content.
    async fn generate_title(&self, content: &str) -> Result<String, Self::Error>;

    /// Summarizes the given note content.
    async fn summarize(&self, content: &str) -> Result<String, Self::Error>;
}

/// Revalidation signal emitted after every successful write so cached
/// board renders are rebuilt on the next load.
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    async fn invalidate(&self, path: &str);
}

/// Invalidator for embedders and tests that keep no render cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInvalidator;

#[async_trait]
impl CacheInvalidator for NoopInvalidator {
    async fn invalidate(&self, _path: &str) {}
}
