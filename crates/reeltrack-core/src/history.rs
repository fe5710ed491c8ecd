use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use reeltrack_models::HistoryEntry;
use reeltrack_store::{
    paths, server_timestamp, timestamp_field, Document, DocumentStore, IdentityProvider,
    SortDirection, StoreResult,
};

/// Append-and-read surface over the per-user audit collection.
///
/// Appends are a best-effort side effect of other operations: a failed
/// audit write is logged and swallowed so it never fails the primary action
/// that produced it.
#[derive(Clone)]
pub struct HistoryLog {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl HistoryLog {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    /// Append one audit entry for `user_id`, timestamped by the store.
    /// Returns whether the entry landed.
    pub async fn append(&self, user_id: &str, message: &str) -> bool {
        let mut fields = Document::new();
        fields.insert("message".to_string(), Value::String(message.to_string()));
        fields.insert("timestamp".to_string(), server_timestamp());

        match self.store.add(&paths::user_history(user_id), fields).await {
            Ok(doc_id) => {
                debug!(doc_id = %doc_id, "history entry added");
                true
            }
            Err(e) => {
                warn!(error = %e, "failed to add history entry");
                false
            }
        }
    }

    /// The signed-in user's history, newest first. Store failure propagates
    /// to the caller; signed out yields an empty history.
    pub async fn recent(&self) -> StoreResult<Vec<HistoryEntry>> {
        let user_id = match self.identity.current_user_id() {
            Some(id) => id,
            None => return Ok(Vec::new()),
        };

        let docs = self
            .store
            .query(
                &paths::user_history(&user_id),
                "timestamp",
                SortDirection::Descending,
            )
            .await?;

        // Entries without a message are display-useless and skipped.
        Ok(docs
            .iter()
            .filter_map(|doc| {
                let message = doc.get("message")?.as_str()?.to_string();
                Some(HistoryEntry {
                    message,
                    timestamp: timestamp_field(doc, "timestamp"),
                })
            })
            .collect())
    }
}
