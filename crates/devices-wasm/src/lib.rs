use devices_core::{
    decode_devices_payload, edit_path, html, ActivationId, DevicesLoader, Effect,
    FieldClassification, LoaderEvent, SchemaStrategy, CREATE_DEVICE_PATH, DEVICES_PATH,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ViewOptions {
    classification: FieldClassification,
    schema: SchemaStrategy,
}

/// Device list state for a browser page.
///
/// The page owns the HTTP call: `activate()` hands out an activation id, and the page reports the
/// outcome with `fetchSucceeded`/`fetchFailed` using that id. Results for superseded activations
/// are ignored.
#[wasm_bindgen]
pub struct WasmDevicesView {
    loader: DevicesLoader,
    classification: FieldClassification,
    strategy: SchemaStrategy,
    notifications: Vec<String>,
}

#[wasm_bindgen]
impl WasmDevicesView {
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<WasmDevicesView, JsValue> {
        let options: ViewOptions = if options.is_undefined() || options.is_null() {
            ViewOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options).map_err(to_js_error)?
        };
        Ok(Self::with_options(options))
    }

    /// Build a view from a JSON options string (`{"classification": {...}, "schema": "union"}`).
    #[wasm_bindgen(js_name = "fromJson")]
    pub fn from_json(json: &str) -> Result<WasmDevicesView, JsValue> {
        let options: ViewOptions = serde_json::from_str(json).map_err(to_js_error)?;
        Ok(Self::with_options(options))
    }

    /// Start a new load. Returns the id to report the fetch outcome with.
    #[wasm_bindgen(js_name = "activate")]
    pub fn activate(&mut self) -> u32 {
        let mut started = 0;
        for effect in self.loader.handle(LoaderEvent::Activate) {
            if let Effect::StartFetch(activation) = effect {
                started = activation_to_js(activation);
            }
        }
        started
    }

    /// Stop the current load. Returns the cancelled activation id, if one was in flight.
    #[wasm_bindgen(js_name = "deactivate")]
    pub fn deactivate(&mut self) -> Option<u32> {
        self.apply(LoaderEvent::Deactivate)
    }

    #[wasm_bindgen(js_name = "fetchSucceeded")]
    pub fn fetch_succeeded(&mut self, activation: u32, payload: &str) {
        let activation = ActivationId(u64::from(activation));
        let event = match decode_devices_payload(payload) {
            Ok(devices) => LoaderEvent::FetchSucceeded {
                activation,
                devices,
            },
            Err(err) => LoaderEvent::FetchFailed {
                activation,
                error: err.to_string(),
            },
        };
        self.apply(event);
    }

    #[wasm_bindgen(js_name = "fetchFailed")]
    pub fn fetch_failed(&mut self, activation: u32, message: &str) {
        self.apply(LoaderEvent::FetchFailed {
            activation: ActivationId(u64::from(activation)),
            error: message.to_string(),
        });
    }

    #[wasm_bindgen(js_name = "isLoading")]
    pub fn is_loading(&self) -> bool {
        self.loader.state().is_loading()
    }

    /// The current view model as a plain JS object.
    #[wasm_bindgen(js_name = "view")]
    pub fn view(&self) -> Result<JsValue, JsValue> {
        let model = self.loader.view(&self.classification, self.strategy);
        serde_wasm_bindgen::to_value(&model).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = "html")]
    pub fn html(&self) -> String {
        html::render_view(&self.loader.view(&self.classification, self.strategy))
    }

    /// Alerts raised since the last call, oldest first.
    #[wasm_bindgen(js_name = "takeNotifications")]
    pub fn take_notifications(&mut self) -> js_sys::Array {
        self.drain_notifications()
            .into_iter()
            .map(|message| JsValue::from_str(&message))
            .collect()
    }

    #[wasm_bindgen(js_name = "devicesPath")]
    pub fn devices_path() -> String {
        DEVICES_PATH.to_string()
    }

    #[wasm_bindgen(js_name = "createPath")]
    pub fn create_path() -> String {
        CREATE_DEVICE_PATH.to_string()
    }

    #[wasm_bindgen(js_name = "editPath")]
    pub fn edit_path(id: &str) -> String {
        edit_path(id)
    }
}

impl WasmDevicesView {
    fn with_options(options: ViewOptions) -> Self {
        Self {
            loader: DevicesLoader::new(),
            classification: options.classification,
            strategy: options.schema,
            notifications: Vec::new(),
        }
    }

    /// Apply an event. Returns the activation cancelled by it, if any.
    fn apply(&mut self, event: LoaderEvent) -> Option<u32> {
        let mut cancelled = None;
        for effect in self.loader.handle(event) {
            match effect {
                Effect::Notify(message) => self.notifications.push(message),
                Effect::CancelFetch(activation) => cancelled = Some(activation_to_js(activation)),
                Effect::StartFetch(_) => {}
            }
        }
        cancelled
    }

    fn drain_notifications(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notifications)
    }
}

fn activation_to_js(activation: ActivationId) -> u32 {
    u32::try_from(activation.0).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> WasmDevicesView {
        WasmDevicesView::with_options(ViewOptions::default())
    }

    #[test]
    fn failure_is_reported_once() {
        let mut v = view();
        let id = v.activate();
        v.fetch_failed(id, "timeout");
        v.fetch_failed(id, "timeout");
        assert_eq!(
            v.drain_notifications(),
            vec!["Get device data failed: timeout".to_string()]
        );
        assert!(v.drain_notifications().is_empty());
        assert!(v.html().contains(r#"role="alert""#));
    }

    #[test]
    fn malformed_payload_becomes_a_failure() {
        let mut v = view();
        let id = v.activate();
        v.fetch_succeeded(id, r#"{"items":[]}"#);
        assert!(!v.is_loading());
        let notes = v.drain_notifications();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].contains("missing the `devices` key"), "{notes:?}");
    }

    #[test]
    fn stale_activation_is_ignored() {
        let mut v = view();
        let first = v.activate();
        let second = v.activate();
        v.fetch_succeeded(first, r#"{"devices":[{"_id":"old"}]}"#);
        assert!(v.is_loading());
        v.fetch_succeeded(second, r#"{"devices":[{"_id":"new"}]}"#);
        assert!(v.html().contains(r#"<a href="/devices/new/edit">new</a>"#));
        assert!(!v.html().contains("old"));
    }

    #[test]
    fn deactivate_reports_cancelled_activation() {
        let mut v = view();
        let id = v.activate();
        assert_eq!(v.deactivate(), Some(id));
        assert_eq!(v.deactivate(), None);
    }

    #[test]
    fn options_json_selects_union_columns() {
        let mut v = WasmDevicesView::from_json(r#"{"schema":"union"}"#).unwrap();
        let id = v.activate();
        v.fetch_succeeded(id, r#"{"devices":[{"_id":"a"},{"_id":"b","room":"hall"}]}"#);
        assert!(v.html().contains("<th>room</th>"));
    }
}
