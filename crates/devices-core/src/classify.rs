//! Field classification by name.
//!
//! The classification decides how a column's cells are rendered. It depends only on the field
//! name, never on the value, so a column renders the same way for every row.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

pub const DEFAULT_IDENTIFIER_FIELD: &str = "_id";

/// Fields of a device document that carry nested objects or arrays.
pub const DEFAULT_STRUCTURED_FIELDS: &[&str] =
    &["location", "metadata", "sensors", "settings", "status"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    /// Unique record key, rendered as a link to the record's edit view.
    Identifier,
    /// Nested object/array, rendered as its JSON text.
    Structured,
    /// Anything else, rendered as plain text.
    Scalar,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldClassification {
    identifier_field: String,
    structured_fields: BTreeSet<String>,
    overrides: BTreeMap<String, FieldKind>,
}

impl Default for FieldClassification {
    fn default() -> Self {
        Self {
            identifier_field: DEFAULT_IDENTIFIER_FIELD.to_string(),
            structured_fields: DEFAULT_STRUCTURED_FIELDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            overrides: BTreeMap::new(),
        }
    }
}

impl FieldClassification {
    pub fn builder() -> FieldClassificationBuilder {
        FieldClassificationBuilder {
            inner: Self::default(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn identifier_field(&self) -> &str {
        &self.identifier_field
    }

    /// Classify a field by name.
    ///
    /// The identifier field always wins. Explicit overrides come next, then the structured set;
    /// everything else is scalar.
    pub fn classify(&self, field: &str) -> FieldKind {
        if field == self.identifier_field {
            return FieldKind::Identifier;
        }
        if let Some(kind) = self.overrides.get(field) {
            // An override cannot mint a second identifier column.
            return match kind {
                FieldKind::Identifier => FieldKind::Scalar,
                other => *other,
            };
        }
        if self.structured_fields.contains(field) {
            FieldKind::Structured
        } else {
            FieldKind::Scalar
        }
    }
}

#[derive(Clone, Debug)]
pub struct FieldClassificationBuilder {
    inner: FieldClassification,
}

impl FieldClassificationBuilder {
    pub fn identifier_field(mut self, field: impl Into<String>) -> Self {
        self.inner.identifier_field = field.into();
        self
    }

    /// Replace the structured field set.
    pub fn structured_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.structured_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn structured_field(mut self, field: impl Into<String>) -> Self {
        self.inner.structured_fields.insert(field.into());
        self
    }

    pub fn override_field(mut self, field: impl Into<String>, kind: FieldKind) -> Self {
        self.inner.overrides.insert(field.into(), kind);
        self
    }

    pub fn build(self) -> FieldClassification {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_classification() {
        let c = FieldClassification::default();
        assert_eq!(c.classify("_id"), FieldKind::Identifier);
        assert_eq!(c.classify("metadata"), FieldKind::Structured);
        assert_eq!(c.classify("name"), FieldKind::Scalar);
        // Exact, case-sensitive names.
        assert_eq!(c.classify("Metadata"), FieldKind::Scalar);
    }

    #[test]
    fn overrides_beat_structured_set_but_not_identifier() {
        let c = FieldClassification::builder()
            .structured_fields(["payload"])
            .override_field("payload", FieldKind::Scalar)
            .override_field("tags", FieldKind::Structured)
            .override_field("_id", FieldKind::Scalar)
            .override_field("serial", FieldKind::Identifier)
            .build();
        assert_eq!(c.classify("payload"), FieldKind::Scalar);
        assert_eq!(c.classify("tags"), FieldKind::Structured);
        assert_eq!(c.classify("_id"), FieldKind::Identifier);
        assert_eq!(c.classify("serial"), FieldKind::Scalar);
    }

    #[test]
    fn deserializes_partial_config_over_defaults() {
        let c = FieldClassification::from_json_str(
            r#"{"identifierField":"uuid","overrides":{"readings":"structured"}}"#,
        )
        .unwrap();
        assert_eq!(c.identifier_field(), "uuid");
        assert_eq!(c.classify("uuid"), FieldKind::Identifier);
        assert_eq!(c.classify("_id"), FieldKind::Scalar);
        assert_eq!(c.classify("readings"), FieldKind::Structured);
        assert_eq!(c.classify("settings"), FieldKind::Structured);
    }
}
