use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One append-only audit record describing a user action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub message: String,
    /// Server-assigned; absent while a write's timestamp has not resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}
