use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use reeltrack_store::{paths, Document, DocumentStore, IdentityProvider, StoreResult};

/// Thin reader/writer over the `users/{uid}` profile document.
///
/// Reads degrade to display defaults so profile screens render something
/// sensible for brand-new or signed-out users.
pub struct ProfileStore {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl ProfileStore {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    /// The signed-in user's nickname, or `"Default"` when unavailable.
    pub async fn nickname(&self) -> String {
        self.profile_field("nickname", "Default").await
    }

    /// The profile description, or `"-"` when unavailable.
    pub async fn description(&self) -> String {
        self.profile_field("description", "-").await
    }

    /// Replace the whole profile document. Silent no-op when signed out.
    /// `image_url` is an already-hosted location; uploading is someone
    /// else's job.
    pub async fn save(
        &self,
        nickname: &str,
        description: &str,
        image_url: &str,
    ) -> StoreResult<()> {
        let user_id = match self.identity.current_user_id() {
            Some(id) => id,
            None => return Ok(()),
        };

        let mut fields = Document::new();
        fields.insert("nickname".to_string(), Value::String(nickname.to_string()));
        fields.insert(
            "description".to_string(),
            Value::String(description.to_string()),
        );
        fields.insert("image".to_string(), Value::String(image_url.to_string()));
        self.store.set(paths::USERS, &user_id, fields).await
    }

    async fn profile_field(&self, field: &str, default: &str) -> String {
        let user_id = match self.identity.current_user_id() {
            Some(id) => id,
            None => return default.to_string(),
        };

        match self.store.get(paths::USERS, &user_id).await {
            Ok(Some(doc)) => doc
                .get(field)
                .and_then(Value::as_str)
                .unwrap_or(default)
                .to_string(),
            Ok(None) => default.to_string(),
            Err(e) => {
                warn!(field = %field, error = %e, "failed to load profile");
                default.to_string()
            }
        }
    }
}
