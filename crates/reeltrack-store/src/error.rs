use thiserror::Error;

/// Failures surfaced by the remote document store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A targeted update addressed a document that does not exist. Reported
    /// separately from `Unavailable` because it is a precondition violation,
    /// not an infrastructure problem.
    #[error("document not found: {collection}/{doc_id}")]
    NotFound { collection: String, doc_id: String },

    /// The request could not be served (network, permission, quota).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
