use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};

/// Characters escaped when an identifier is placed in a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

pub const DEVICES_PATH: &str = "/devices";
pub const CREATE_DEVICE_PATH: &str = "/devices/new";

/// Navigation targets the device list can request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum Route {
    DeviceList,
    CreateDevice,
    EditDevice(String),
}

impl Route {
    pub fn edit(id: impl Into<String>) -> Self {
        Route::EditDevice(id.into())
    }

    pub fn path(&self) -> String {
        match self {
            Route::DeviceList => DEVICES_PATH.to_string(),
            Route::CreateDevice => CREATE_DEVICE_PATH.to_string(),
            Route::EditDevice(id) => edit_path(id),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

pub fn edit_path(id: &str) -> String {
    format!(
        "{DEVICES_PATH}/{}/edit",
        utf8_percent_encode(id, PATH_SEGMENT)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fixed_paths() {
        assert_eq!(Route::DeviceList.path(), "/devices");
        assert_eq!(Route::CreateDevice.path(), "/devices/new");
        assert_eq!(Route::edit("abc123").path(), "/devices/abc123/edit");
    }

    #[test]
    fn identifier_stays_in_one_segment() {
        assert_eq!(edit_path("a/b c"), "/devices/a%2Fb%20c/edit");
        assert_eq!(edit_path("x?y#z"), "/devices/x%3Fy%23z/edit");
    }
}
