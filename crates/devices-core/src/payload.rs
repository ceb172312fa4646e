use serde_json::Value as JsonValue;

use crate::record::{Collection, Record};

/// Key holding the record array in a `GET /devices` response body.
pub const DEVICES_KEY: &str = "devices";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("invalid devices json: {0}")]
    InvalidJson(String),
    #[error("devices payload must be a JSON object")]
    NotAnObject,
    #[error("devices payload is missing the `devices` key")]
    MissingDevices,
    #[error("`devices` must be an array")]
    DevicesNotArray,
    #[error("device at index {0} is not a JSON object")]
    RecordNotObject(usize),
}

/// Decode a `{ "devices": [...] }` response body into a collection.
///
/// A `null` collection is treated as empty; every other shape mismatch is an error.
pub fn decode_devices_payload(text: &str) -> Result<Collection, PayloadError> {
    let value: JsonValue =
        serde_json::from_str(text).map_err(|err| PayloadError::InvalidJson(err.to_string()))?;
    decode_devices_value(value)
}

pub fn decode_devices_value(value: JsonValue) -> Result<Collection, PayloadError> {
    let JsonValue::Object(mut root) = value else {
        return Err(PayloadError::NotAnObject);
    };

    let devices = match root.remove(DEVICES_KEY) {
        None => return Err(PayloadError::MissingDevices),
        Some(JsonValue::Null) => return Ok(Vec::new()),
        Some(JsonValue::Array(items)) => items,
        Some(_) => return Err(PayloadError::DevicesNotArray),
    };

    devices
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            JsonValue::Object(fields) => Ok(Record::from_map(fields)),
            _ => Err(PayloadError::RecordNotObject(idx)),
        })
        .collect()
}
