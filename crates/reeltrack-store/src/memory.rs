use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::adapter::{DocumentStore, SortDirection};
use crate::document::{resolve_server_timestamps, Document};
use crate::error::{StoreError, StoreResult};

/// In-memory `DocumentStore` for tests and embedding.
///
/// Iteration order is deterministic (documents sort by id), generated ids
/// are sequential, and whole collections can be made to fail so callers can
/// exercise their degraded paths.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    collections: HashMap<String, BTreeMap<String, Document>>,
    failing: HashSet<String>,
    next_id: u64,
}

impl State {
    fn check_available(&self, collection: &str) -> StoreResult<()> {
        if self.failing.contains(collection) {
            debug!(collection = %collection, "serving injected failure");
            return Err(StoreError::Unavailable(format!(
                "injected failure for collection {}",
                collection
            )));
        }
        Ok(())
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation against `collection` fail with `Unavailable`.
    pub async fn fail_collection(&self, collection: &str) {
        self.state
            .write()
            .await
            .failing
            .insert(collection.to_string());
    }

    /// Undo `fail_collection`.
    pub async fn restore_collection(&self, collection: &str) {
        self.state.write().await.failing.remove(collection);
    }

    /// Number of documents currently held in `collection`.
    pub async fn doc_count(&self, collection: &str) -> usize {
        self.state
            .read()
            .await
            .collections
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, doc_id: &str) -> StoreResult<Option<Document>> {
        let state = self.state.read().await;
        state.check_available(collection)?;
        Ok(state
            .collections
            .get(collection)
            .and_then(|docs| docs.get(doc_id))
            .cloned())
    }

    async fn set(&self, collection: &str, doc_id: &str, mut fields: Document) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.check_available(collection)?;
        resolve_server_timestamps(&mut fields, Utc::now());
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(doc_id.to_string(), fields);
        Ok(())
    }

    async fn update(&self, collection: &str, doc_id: &str, mut patch: Document) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.check_available(collection)?;
        resolve_server_timestamps(&mut patch, Utc::now());
        let doc = state
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(doc_id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                doc_id: doc_id.to_string(),
            })?;
        for (key, value) in patch {
            doc.insert(key, value);
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, doc_id: &str) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.check_available(collection)?;
        if let Some(docs) = state.collections.get_mut(collection) {
            docs.remove(doc_id);
        }
        Ok(())
    }

    async fn add(&self, collection: &str, mut fields: Document) -> StoreResult<String> {
        let mut state = self.state.write().await;
        state.check_available(collection)?;
        resolve_server_timestamps(&mut fields, Utc::now());
        state.next_id += 1;
        let doc_id = format!("doc-{:06}", state.next_id);
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(doc_id.clone(), fields);
        Ok(doc_id)
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let state = self.state.read().await;
        state.check_available(collection)?;
        Ok(state
            .collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn query(
        &self,
        collection: &str,
        order_by: &str,
        direction: SortDirection,
    ) -> StoreResult<Vec<Document>> {
        let mut docs: Vec<Document> = self
            .list(collection)
            .await?
            .into_iter()
            .filter(|doc| doc.contains_key(order_by))
            .collect();
        docs.sort_by(|a, b| compare_field(a.get(order_by), b.get(order_by)));
        if direction == SortDirection::Descending {
            docs.reverse();
        }
        Ok(docs)
    }
}

// RFC 3339 strings compare chronologically, so string ordering covers the
// timestamp fields this store is queried by.
fn compare_field(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        _ => Ordering::Equal,
    }
}
