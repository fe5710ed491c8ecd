use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use reeltrack_models::{ListKind, Title};
use reeltrack_store::{
    paths, server_timestamp, Document, DocumentStore, IdentityProvider, StoreError,
};

use crate::history::HistoryLog;

/// Field stamped onto a list document when a title enters the list.
pub(crate) const ADDED_AT: &str = "addedAt";

/// Outcome of a move. The operation is not transactional: phases that
/// failed are reported here and nothing that already happened is rolled
/// back, so callers must treat partial completion as possible.
#[derive(Debug, Default)]
pub struct MoveReport {
    /// Lists the title was vacated from before the insert.
    pub removed_from: Vec<ListKind>,
    pub inserted: bool,
    /// Whether `addedAt` was stamped. An inserted-but-unstamped membership
    /// is valid but excluded from monthly statistics until re-moved.
    pub stamped: bool,
    pub history_recorded: bool,
    pub errors: Vec<String>,
}

/// Outcome of removing a title from every list.
#[derive(Debug, Default)]
pub struct RemovalReport {
    pub removed_from: Vec<ListKind>,
    pub errors: Vec<String>,
}

/// Enforces the at-most-one-list invariant for a user's titles.
pub struct ListManager {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    history: HistoryLog,
}

impl ListManager {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        let history = HistoryLog::new(store.clone(), identity.clone());
        Self {
            store,
            identity,
            history,
        }
    }

    /// Relocate `title` so that it exists in `target` and nowhere else.
    ///
    /// Phases run in a fixed order: vacate all five lists, insert into the
    /// target keyed by the title id (an overwrite, never a duplicate),
    /// stamp `addedAt` with the store clock, then append the audit entry.
    /// A failed insert stops the chain. A failed stamp leaves the
    /// membership without `addedAt` and skips the audit entry. A failed
    /// audit entry is swallowed; the membership stands.
    pub async fn move_to_list(&self, title: &Title, target: ListKind) -> MoveReport {
        let mut report = MoveReport::default();

        let user_id = match self.identity.current_user_id() {
            Some(id) => id,
            None => return report,
        };

        let removal = self.remove_everywhere(&user_id, &title.id).await;
        report.removed_from = removal.removed_from;
        report.errors = removal.errors;

        let fields = match title.to_document() {
            Ok(fields) => fields,
            Err(e) => {
                report
                    .errors
                    .push(format!("failed to encode title {}: {}", title.id, e));
                return report;
            }
        };

        let collection = paths::user_list(&user_id, target.collection_name());
        if let Err(e) = self.store.set(&collection, &title.id, fields).await {
            warn!(title_id = %title.id, list = %target, error = %e, "failed to insert title into list");
            report
                .errors
                .push(format!("insert into {} failed: {}", target, e));
            return report;
        }
        report.inserted = true;

        let mut stamp = Document::new();
        stamp.insert(ADDED_AT.to_string(), server_timestamp());
        if let Err(e) = self.store.update(&collection, &title.id, stamp).await {
            warn!(title_id = %title.id, list = %target, error = %e, "failed to stamp addedAt");
            report
                .errors
                .push(format!("addedAt stamp in {} failed: {}", target, e));
            return report;
        }
        report.stamped = true;

        let message = format!(
            "{} was added to '{}' list.",
            title.display_name(),
            target.display_name()
        );
        report.history_recorded = self.history.append(&user_id, &message).await;

        info!(title_id = %title.id, list = %target, "title moved");
        report
    }

    /// Remove the title from every list in which it currently exists.
    /// Idempotent: once the title is absent everywhere, repeated calls
    /// change nothing.
    pub async fn remove_from_all_lists(&self, title_id: &str) -> RemovalReport {
        let user_id = match self.identity.current_user_id() {
            Some(id) => id,
            None => return RemovalReport::default(),
        };
        self.remove_everywhere(&user_id, title_id).await
    }

    /// The list currently holding `title_id`, if any.
    ///
    /// Five probes race; the first discovered hit wins (discovery order,
    /// not list priority). Probes still in flight when a hit arrives are
    /// never cancelled; their late results go to a dropped receiver.
    pub async fn find_containing_list(&self, title_id: &str) -> Option<ListKind> {
        let user_id = self.identity.current_user_id()?;

        let (tx, mut rx) = mpsc::channel(ListKind::ALL.len());
        for list in ListKind::ALL {
            let store = self.store.clone();
            let collection = paths::user_list(&user_id, list.collection_name());
            let title_id = title_id.to_string();
            let tx = tx.clone();
            tokio::spawn(async move {
                let found = match store.get(&collection, &title_id).await {
                    Ok(doc) => doc.is_some(),
                    Err(e) => {
                        debug!(list = %list, error = %e, "list probe failed");
                        false
                    }
                };
                let _ = tx.send((list, found)).await;
            });
        }
        drop(tx);

        while let Some((list, found)) = rx.recv().await {
            if found {
                return Some(list);
            }
        }
        None
    }

    /// Every title in `list`. Read failures degrade to an empty collection
    /// and documents that do not decode are skipped.
    pub async fn titles_in(&self, list: ListKind) -> Vec<Title> {
        let user_id = match self.identity.current_user_id() {
            Some(id) => id,
            None => return Vec::new(),
        };
        fetch_list_titles(self.store.as_ref(), &user_id, list).await
    }

    async fn remove_everywhere(&self, user_id: &str, title_id: &str) -> RemovalReport {
        let deletions = ListKind::ALL.into_iter().map(|list| {
            let collection = paths::user_list(user_id, list.collection_name());
            async move {
                let existing = self.store.get(&collection, title_id).await?;
                if existing.is_none() {
                    return Ok(None);
                }
                self.store.delete(&collection, title_id).await?;
                Ok::<_, StoreError>(Some(list))
            }
        });

        let mut report = RemovalReport::default();
        for (list, result) in ListKind::ALL.into_iter().zip(join_all(deletions).await) {
            match result {
                Ok(Some(removed)) => report.removed_from.push(removed),
                Ok(None) => {}
                Err(e) => {
                    warn!(title_id = %title_id, list = %list, error = %e, "failed to remove title from list");
                    report
                        .errors
                        .push(format!("remove from {} failed: {}", list, e));
                }
            }
        }
        report
    }
}

/// Read one list collection into titles, fail-soft.
pub(crate) async fn fetch_list_titles(
    store: &dyn DocumentStore,
    user_id: &str,
    list: ListKind,
) -> Vec<Title> {
    let collection = paths::user_list(user_id, list.collection_name());
    let docs = match store.list(&collection).await {
        Ok(docs) => docs,
        Err(e) => {
            warn!(list = %list, error = %e, "failed to read list");
            return Vec::new();
        }
    };

    docs.iter()
        .filter_map(|doc| match Title::from_document(doc) {
            Ok(title) => Some(title),
            Err(e) => {
                warn!(list = %list, error = %e, "skipping undecodable list document");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reeltrack_store::{
        MemoryStore, SortDirection, StaticIdentity, StoreResult,
    };
    use serde_json::json;

    fn create_title(id: &str, name: &str) -> Title {
        Title {
            id: id.to_string(),
            primary_title: Some(name.to_string()),
            start_year: Some(2020),
            ..Title::default()
        }
    }

    fn manager_for(store: Arc<MemoryStore>, identity: StaticIdentity) -> ListManager {
        ListManager::new(store, Arc::new(identity))
    }

    async fn seed(store: &MemoryStore, list: ListKind, title: &Title) {
        store
            .set(
                &paths::user_list("u1", list.collection_name()),
                &title.id,
                title.to_document().unwrap(),
            )
            .await
            .unwrap();
    }

    async fn lists_containing(store: &MemoryStore, title_id: &str) -> Vec<ListKind> {
        let mut holding = Vec::new();
        for list in ListKind::ALL {
            let doc = store
                .get(&paths::user_list("u1", list.collection_name()), title_id)
                .await
                .unwrap();
            if doc.is_some() {
                holding.push(list);
            }
        }
        holding
    }

    #[tokio::test]
    async fn test_move_leaves_exactly_one_membership() {
        let store = Arc::new(MemoryStore::new());
        let title = create_title("tt001", "Stalker");
        // Violated starting state: present in two lists at once.
        seed(&store, ListKind::Planned, &title).await;
        seed(&store, ListKind::Watching, &title).await;

        let manager = manager_for(store.clone(), StaticIdentity::signed_in("u1"));
        let report = manager.move_to_list(&title, ListKind::Completed).await;

        assert!(report.inserted);
        assert!(report.stamped);
        assert!(report.errors.is_empty());
        assert_eq!(
            report.removed_from,
            vec![ListKind::Planned, ListKind::Watching]
        );
        assert_eq!(
            lists_containing(&store, "tt001").await,
            vec![ListKind::Completed]
        );
    }

    #[tokio::test]
    async fn test_move_stamps_added_at() {
        let store = Arc::new(MemoryStore::new());
        let title = create_title("tt001", "Stalker");
        let manager = manager_for(store.clone(), StaticIdentity::signed_in("u1"));

        manager.move_to_list(&title, ListKind::Watching).await;

        let doc = store
            .get(&paths::user_list("u1", "watching"), "tt001")
            .await
            .unwrap()
            .unwrap();
        assert!(reeltrack_store::timestamp_field(&doc, ADDED_AT).is_some());
    }

    #[tokio::test]
    async fn test_move_appends_history_message() {
        let store = Arc::new(MemoryStore::new());
        let title = create_title("tt001", "Stalker");
        let manager = manager_for(store.clone(), StaticIdentity::signed_in("u1"));

        let report = manager.move_to_list(&title, ListKind::OnHold).await;
        assert!(report.history_recorded);

        let docs = store
            .query("users/u1/history", "timestamp", SortDirection::Descending)
            .await
            .unwrap();
        assert_eq!(
            docs[0].get("message"),
            Some(&json!("Stalker was added to 'On-Hold' list."))
        );
    }

    #[tokio::test]
    async fn test_move_survives_history_failure() {
        let store = Arc::new(MemoryStore::new());
        store.fail_collection("users/u1/history").await;
        let title = create_title("tt001", "Stalker");
        let manager = manager_for(store.clone(), StaticIdentity::signed_in("u1"));

        let report = manager.move_to_list(&title, ListKind::Completed).await;

        assert!(report.inserted);
        assert!(report.stamped);
        assert!(!report.history_recorded);
        assert_eq!(
            lists_containing(&store, "tt001").await,
            vec![ListKind::Completed]
        );
    }

    #[tokio::test]
    async fn test_move_insert_failure_stops_chain() {
        let store = Arc::new(MemoryStore::new());
        store.fail_collection("users/u1/dropped").await;
        let title = create_title("tt001", "Stalker");
        let manager = manager_for(store.clone(), StaticIdentity::signed_in("u1"));

        let report = manager.move_to_list(&title, ListKind::Dropped).await;

        assert!(!report.inserted);
        assert!(!report.stamped);
        assert!(!report.history_recorded);
        assert_eq!(report.errors.len(), 2); // probe + insert against the failing list
        assert_eq!(store.doc_count("users/u1/history").await, 0);
    }

    // Wraps the in-memory store so only the stamp phase fails, leaving the
    // degraded inserted-but-unstamped membership behind.
    struct UpdateFails(MemoryStore);

    #[async_trait]
    impl DocumentStore for UpdateFails {
        async fn get(&self, collection: &str, doc_id: &str) -> StoreResult<Option<Document>> {
            self.0.get(collection, doc_id).await
        }
        async fn set(&self, collection: &str, doc_id: &str, fields: Document) -> StoreResult<()> {
            self.0.set(collection, doc_id, fields).await
        }
        async fn update(&self, collection: &str, doc_id: &str, _patch: Document) -> StoreResult<()> {
            Err(StoreError::Unavailable(format!(
                "update rejected: {}/{}",
                collection, doc_id
            )))
        }
        async fn delete(&self, collection: &str, doc_id: &str) -> StoreResult<()> {
            self.0.delete(collection, doc_id).await
        }
        async fn add(&self, collection: &str, fields: Document) -> StoreResult<String> {
            self.0.add(collection, fields).await
        }
        async fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
            self.0.list(collection).await
        }
        async fn query(
            &self,
            collection: &str,
            order_by: &str,
            direction: SortDirection,
        ) -> StoreResult<Vec<Document>> {
            self.0.query(collection, order_by, direction).await
        }
    }

    #[tokio::test]
    async fn test_move_stamp_failure_leaves_unstamped_membership() {
        let store = Arc::new(UpdateFails(MemoryStore::new()));
        let title = create_title("tt001", "Stalker");
        let manager = ListManager::new(
            store.clone(),
            Arc::new(StaticIdentity::signed_in("u1")),
        );

        let report = manager.move_to_list(&title, ListKind::Watching).await;

        assert!(report.inserted);
        assert!(!report.stamped);
        assert!(!report.history_recorded);
        assert_eq!(report.errors.len(), 1);

        let doc = store
            .0
            .get(&paths::user_list("u1", "watching"), "tt001")
            .await
            .unwrap()
            .unwrap();
        assert!(!doc.contains_key(ADDED_AT));
        assert_eq!(store.0.doc_count("users/u1/history").await, 0);
    }

    #[tokio::test]
    async fn test_remove_from_all_lists_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let title = create_title("tt001", "Stalker");
        seed(&store, ListKind::Dropped, &title).await;
        let manager = manager_for(store.clone(), StaticIdentity::signed_in("u1"));

        let first = manager.remove_from_all_lists("tt001").await;
        assert_eq!(first.removed_from, vec![ListKind::Dropped]);

        let second = manager.remove_from_all_lists("tt001").await;
        assert!(second.removed_from.is_empty());
        assert!(second.errors.is_empty());
        assert!(lists_containing(&store, "tt001").await.is_empty());
    }

    #[tokio::test]
    async fn test_find_containing_list() {
        let store = Arc::new(MemoryStore::new());
        let title = create_title("tt001", "Stalker");
        seed(&store, ListKind::OnHold, &title).await;
        let manager = manager_for(store.clone(), StaticIdentity::signed_in("u1"));

        assert_eq!(
            manager.find_containing_list("tt001").await,
            Some(ListKind::OnHold)
        );
        assert_eq!(manager.find_containing_list("tt404").await, None);
    }

    #[tokio::test]
    async fn test_titles_in_skips_undecodable_documents() {
        let store = Arc::new(MemoryStore::new());
        let title = create_title("tt001", "Stalker");
        seed(&store, ListKind::Watching, &title).await;
        // A document whose id is not a string fails Title decoding.
        let mut broken = Document::new();
        broken.insert("id".to_string(), json!(42));
        store
            .set(&paths::user_list("u1", "watching"), "broken", broken)
            .await
            .unwrap();

        let manager = manager_for(store.clone(), StaticIdentity::signed_in("u1"));
        let titles = manager.titles_in(ListKind::Watching).await;
        assert_eq!(titles.len(), 1);
        assert_eq!(titles[0].id, "tt001");
    }

    #[tokio::test]
    async fn test_titles_in_degrades_to_empty_on_read_failure() {
        let store = Arc::new(MemoryStore::new());
        store.fail_collection("users/u1/planned").await;
        let manager = manager_for(store.clone(), StaticIdentity::signed_in("u1"));

        assert!(manager.titles_in(ListKind::Planned).await.is_empty());
    }

    #[tokio::test]
    async fn test_signed_out_operations_are_silent_no_ops() {
        let store = Arc::new(MemoryStore::new());
        let title = create_title("tt001", "Stalker");
        let manager = manager_for(store.clone(), StaticIdentity::signed_out());

        let report = manager.move_to_list(&title, ListKind::Completed).await;
        assert!(!report.inserted);
        assert!(report.errors.is_empty());

        let removal = manager.remove_from_all_lists("tt001").await;
        assert!(removal.removed_from.is_empty());

        assert_eq!(manager.find_containing_list("tt001").await, None);
        assert!(manager.titles_in(ListKind::Completed).await.is_empty());
        assert!(lists_containing(&store, "tt001").await.is_empty());
        assert_eq!(store.doc_count("users/u1/history").await, 0);
    }
}
