use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use reeltrack_models::{ListKind, Title};
use reeltrack_store::{paths, Document, DocumentStore, IdentityProvider, StoreResult};

use crate::history::HistoryLog;

/// Field on a list document holding the user's own rating.
const USER_RATING: &str = "userRating";

/// Convert a 0.0-10.0 rating to its stored half-point integer (0-20).
pub fn stored_rating(rating: f32) -> i64 {
    (rating * 2.0).round() as i64
}

/// Records a user's rating on the list document currently holding a title,
/// deriving an audit entry as a side effect.
pub struct RatingRecorder {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    history: HistoryLog,
}

impl RatingRecorder {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        let history = HistoryLog::new(store.clone(), identity.clone());
        Self {
            store,
            identity,
            history,
        }
    }

    /// Record the user's rating for a title already present in `list`.
    ///
    /// The update targets an existing document: rating a title that is not
    /// in the list fails with `NotFound` rather than creating one. The
    /// audit entry is best-effort; the rating write stands without it.
    pub async fn set_rating(&self, title: &Title, rating: f32, list: ListKind) -> StoreResult<()> {
        let user_id = match self.identity.current_user_id() {
            Some(id) => id,
            None => return Ok(()),
        };

        let stored = stored_rating(rating);
        let mut patch = Document::new();
        patch.insert(USER_RATING.to_string(), Value::from(stored));

        let collection = paths::user_list(&user_id, list.collection_name());
        self.store.update(&collection, &title.id, patch).await?;

        let message = format!("{} was rated {}.", title.display_name(), stored);
        self.history.append(&user_id, &message).await;

        Ok(())
    }

    /// The stored rating for `title_id` in `list`. Absent when the document
    /// is missing, the field is unset, or the read fails - never zero by
    /// default.
    pub async fn get_rating(&self, title_id: &str, list: ListKind) -> Option<i64> {
        let user_id = self.identity.current_user_id()?;

        let collection = paths::user_list(&user_id, list.collection_name());
        let doc = match self.store.get(&collection, title_id).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(title_id = %title_id, list = %list, error = %e, "failed to load rating");
                return None;
            }
        };

        doc?.get(USER_RATING)?.as_i64()
    }
}
