use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// How the column set is derived from a collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SchemaStrategy {
    /// Columns are the first record's keys. Keys that only appear in later records are not shown.
    #[default]
    FirstRecord,
    /// First record's keys, then every further key in first-seen order.
    Union,
}

/// Ordered, duplicate-free list of field names used for the header and every row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnSchema {
    columns: Vec<String>,
}

impl ColumnSchema {
    /// Derive the columns for `records`. Returns `None` for an empty collection.
    pub fn infer(records: &[Record], strategy: SchemaStrategy) -> Option<Self> {
        let first = records.first()?;
        let mut columns: Vec<String> = first.keys().map(str::to_string).collect();

        if strategy == SchemaStrategy::Union {
            let mut seen: HashSet<String> = columns.iter().cloned().collect();
            for record in &records[1..] {
                for key in record.keys() {
                    if seen.insert(key.to_string()) {
                        columns.push(key.to_string());
                    }
                }
            }
        }

        log::debug!(
            "inferred {} columns from {} records ({strategy:?})",
            columns.len(),
            records.len()
        );
        Some(Self { columns })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }
}
