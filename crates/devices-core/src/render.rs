//! Dynamic table rendering.
//!
//! Turns a loaded collection into a header row and a grid of display cells. The output is a pure
//! function of the collection, the field classification and the schema strategy.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::classify::{FieldClassification, FieldKind};
use crate::record::{scalar_text, Record};
use crate::routes::Route;
use crate::schema::{ColumnSchema, SchemaStrategy};

pub const NO_DATA_MESSAGE: &str = "No devices data yet!";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Cell {
    /// Navigation link to the record's edit view.
    Link { text: String, href: String },
    Text { text: String },
    Empty,
}

impl Cell {
    fn text(text: impl Into<String>) -> Self {
        Cell::Text { text: text.into() }
    }

    /// Visible text of the cell.
    pub fn display_text(&self) -> &str {
        match self {
            Cell::Link { text, .. } | Cell::Text { text } => text,
            Cell::Empty => "",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub kind: FieldKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Stable key for the row: `id:{identifier}`, or `row:{index}` for a record without one.
    /// The prefixes keep the two namespaces apart.
    pub key: String,
    pub cells: Vec<Cell>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<Header>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableOutcome {
    NoData,
    Table(Table),
}

pub fn render_table(
    records: &[Record],
    classification: &FieldClassification,
    strategy: SchemaStrategy,
) -> TableOutcome {
    let Some(schema) = ColumnSchema::infer(records, strategy) else {
        return TableOutcome::NoData;
    };

    let headers: Vec<Header> = schema
        .iter()
        .map(|name| Header {
            name: name.to_string(),
            kind: classification.classify(name),
        })
        .collect();

    let rows = records
        .iter()
        .enumerate()
        .map(|(idx, record)| render_row(idx, record, &headers, classification))
        .collect();

    TableOutcome::Table(Table { headers, rows })
}

fn render_row(
    idx: usize,
    record: &Record,
    headers: &[Header],
    classification: &FieldClassification,
) -> Row {
    let key = match record.identifier(classification) {
        Some(id) => format!("id:{id}"),
        None => format!("row:{idx}"),
    };
    let cells = headers
        .iter()
        .map(|header| match record.get(&header.name) {
            Some(value) => format_cell(header.kind, value),
            None => Cell::Empty,
        })
        .collect();
    Row { key, cells }
}

/// Format one value according to its column's classification.
pub fn format_cell(kind: FieldKind, value: &JsonValue) -> Cell {
    match kind {
        FieldKind::Identifier => match scalar_text(value) {
            Some(id) if !id.is_empty() => Cell::Link {
                href: Route::edit(id.as_str()).path(),
                text: id,
            },
            // Without a usable id there is nothing to link to.
            _ => format_scalar(value),
        },
        FieldKind::Structured => Cell::text(value.to_string()),
        FieldKind::Scalar => format_scalar(value),
    }
}

fn format_scalar(value: &JsonValue) -> Cell {
    match value {
        JsonValue::Null => Cell::Empty,
        JsonValue::String(s) => Cell::text(s.as_str()),
        other => Cell::text(other.to_string()),
    }
}
