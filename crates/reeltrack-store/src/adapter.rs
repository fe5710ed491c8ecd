use async_trait::async_trait;

use crate::document::Document;
use crate::error::StoreResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// The consumed surface of the remote document database.
///
/// Implementations are remote and eventually consistent: no multi-document
/// transactions, and read-after-write is only guaranteed where the engine
/// sequences the calls itself. Every operation stands alone; callers
/// tolerate partial completion of multi-call flows.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document. `Ok(None)` when absent.
    async fn get(&self, collection: &str, doc_id: &str) -> StoreResult<Option<Document>>;

    /// Create or fully replace one document.
    async fn set(&self, collection: &str, doc_id: &str, fields: Document) -> StoreResult<()>;

    /// Patch fields of an existing document. Fails with `NotFound` when the
    /// document is absent; never creates one.
    async fn update(&self, collection: &str, doc_id: &str, patch: Document) -> StoreResult<()>;

    /// Delete one document. No-op when already absent.
    async fn delete(&self, collection: &str, doc_id: &str) -> StoreResult<()>;

    /// Insert a document under a store-generated id, returning the id.
    async fn add(&self, collection: &str, fields: Document) -> StoreResult<String>;

    /// Every document in a collection, in unspecified order.
    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>>;

    /// Documents ordered by `order_by`. Documents lacking the field are
    /// omitted from the result.
    async fn query(
        &self,
        collection: &str,
        order_by: &str,
        direction: SortDirection,
    ) -> StoreResult<Vec<Document>>;
}
