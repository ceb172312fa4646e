//! Core of the devices admin view.
//!
//! This crate has no I/O. It exposes:
//! - the [`Record`]/[`Collection`] model and `GET /devices` payload decoding
//! - name-based [`FieldClassification`]
//! - [`ColumnSchema`] inference from the data itself
//! - the dynamic table renderer ([`render_table`]) and its HTML form
//! - the [`DevicesLoader`] state machine driving loading, ready and failed views

mod classify;
pub mod html;
mod loader;
mod payload;
mod record;
mod render;
mod routes;
mod schema;
mod view;

pub use classify::{
    FieldClassification, FieldClassificationBuilder, FieldKind, DEFAULT_IDENTIFIER_FIELD,
    DEFAULT_STRUCTURED_FIELDS,
};
pub use loader::{
    view_for_state, ActivationId, DevicesLoader, Effect, LoadState, LoaderEvent,
    FETCH_FAILED_PREFIX,
};
pub use payload::{decode_devices_payload, decode_devices_value, PayloadError, DEVICES_KEY};
pub use record::{Collection, Record};
pub use render::{format_cell, render_table, Cell, Header, Row, Table, TableOutcome, NO_DATA_MESSAGE};
pub use routes::{edit_path, Route, CREATE_DEVICE_PATH, DEVICES_PATH};
pub use schema::{ColumnSchema, SchemaStrategy};
pub use view::{ViewBody, ViewModel};
