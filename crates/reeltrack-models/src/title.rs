use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A catalog entry as it appears inside a user's list collections.
///
/// The engine reads the fields it needs for filtering and statistics;
/// everything else lands in `extra` and is re-persisted verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Title {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_year: Option<i32>,
    /// Catalog average on a 0-10 scale, not the user's own rating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_votes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_minutes: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Title {
    pub fn display_name(&self) -> &str {
        self.primary_title.as_deref().unwrap_or("Unknown Title")
    }

    /// Encode into the stored document shape.
    pub fn to_document(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            other => Err(serde::ser::Error::custom(format!(
                "title serialized to non-object value: {}",
                other
            ))),
        }
    }

    /// Decode from a stored document.
    pub fn from_document(doc: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(doc.clone()))
    }
}
