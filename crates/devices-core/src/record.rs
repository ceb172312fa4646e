use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::classify::FieldClassification;

/// A single device entry as received from the API.
///
/// Keys keep the order they had on the wire; the renderer relies on it to lay out columns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, JsonValue>,
}

/// Ordered sequence of records in the order the API returned them.
pub type Collection = Vec<Record>;

impl Record {
    pub fn from_map(fields: Map<String, JsonValue>) -> Self {
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Textual form of the identifier value, if the record carries a non-empty one.
    pub fn identifier(&self, classification: &FieldClassification) -> Option<String> {
        self.get(classification.identifier_field())
            .and_then(scalar_text)
            .filter(|id| !id.is_empty())
    }
}

impl From<Map<String, JsonValue>> for Record {
    fn from(fields: Map<String, JsonValue>) -> Self {
        Self::from_map(fields)
    }
}

impl<K: Into<String>> FromIterator<(K, JsonValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, JsonValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Plain text for a scalar JSON value. `null` and nested values have none.
pub(crate) fn scalar_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn keeps_wire_key_order() {
        let record: Record =
            serde_json::from_str(r#"{"zeta":1,"_id":"a","alpha":true}"#).unwrap();
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["zeta", "_id", "alpha"]);
    }

    #[test]
    fn identifier_uses_configured_field() {
        let record: Record = [("_id", json!("abc123")), ("uid", json!(7))]
            .into_iter()
            .collect();
        assert_eq!(
            record.identifier(&FieldClassification::default()).as_deref(),
            Some("abc123")
        );

        let by_uid = FieldClassification::builder().identifier_field("uid").build();
        assert_eq!(record.identifier(&by_uid).as_deref(), Some("7"));
    }

    #[test]
    fn object_or_empty_identifier_has_no_text() {
        let record: Record = [("_id", json!({"$oid": "x"}))].into_iter().collect();
        assert_eq!(record.identifier(&FieldClassification::default()), None);
        let record: Record = [("_id", json!(""))].into_iter().collect();
        assert_eq!(record.identifier(&FieldClassification::default()), None);
    }
}
