use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// A stored document: a JSON object addressed by `collection` + `doc_id`.
pub type Document = Map<String, Value>;

/// Reserved key marking a value the store must replace with its own clock
/// when the write lands.
pub const SERVER_TIMESTAMP_KEY: &str = "__serverTimestamp";

/// Sentinel for a server-assigned timestamp. Opaque to callers; store
/// implementations resolve it at write time.
pub fn server_timestamp() -> Value {
    let mut sentinel = Map::new();
    sentinel.insert(SERVER_TIMESTAMP_KEY.to_string(), Value::Bool(true));
    Value::Object(sentinel)
}

pub fn is_server_timestamp(value: &Value) -> bool {
    matches!(value, Value::Object(map) if map.contains_key(SERVER_TIMESTAMP_KEY))
}

/// Replace every sentinel field of `fields` with `now` in RFC 3339 form.
/// Store implementations call this once per incoming write.
pub fn resolve_server_timestamps(fields: &mut Document, now: DateTime<Utc>) {
    for value in fields.values_mut() {
        if is_server_timestamp(value) {
            *value = Value::String(now.to_rfc3339());
        }
    }
}

/// Read `field` as an RFC 3339 timestamp. `None` when the field is absent,
/// still an unresolved sentinel, or not a parseable timestamp.
pub fn timestamp_field(doc: &Document, field: &str) -> Option<DateTime<Utc>> {
    doc.get(field)
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|ts| ts.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_resolve_replaces_only_sentinels() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        let mut fields = Document::new();
        fields.insert("addedAt".to_string(), server_timestamp());
        fields.insert("name".to_string(), Value::String("Solaris".to_string()));

        resolve_server_timestamps(&mut fields, now);

        assert_eq!(timestamp_field(&fields, "addedAt"), Some(now));
        assert_eq!(
            fields.get("name"),
            Some(&Value::String("Solaris".to_string()))
        );
    }

    #[test]
    fn test_timestamp_field_rejects_unresolved_sentinel() {
        let mut fields = Document::new();
        fields.insert("addedAt".to_string(), server_timestamp());
        assert_eq!(timestamp_field(&fields, "addedAt"), None);
    }

    #[test]
    fn test_timestamp_field_rejects_garbage() {
        let mut fields = Document::new();
        fields.insert(
            "addedAt".to_string(),
            Value::String("not a timestamp".to_string()),
        );
        assert_eq!(timestamp_field(&fields, "addedAt"), None);
        assert_eq!(timestamp_field(&fields, "missing"), None);
    }
}
