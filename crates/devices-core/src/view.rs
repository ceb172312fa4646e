use serde::{Deserialize, Serialize};

use crate::render::{Table, NO_DATA_MESSAGE};
use crate::routes::Route;

/// The part of the device list that is visible at a given moment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ViewBody {
    /// Non-interactive progress indicator.
    Progress,
    Table(Table),
    NoData { message: String },
}

impl ViewBody {
    pub fn no_data() -> Self {
        ViewBody::NoData {
            message: NO_DATA_MESSAGE.to_string(),
        }
    }
}

/// Everything the device list shows: one body, the create action and an optional alert.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub body: ViewBody,
    pub create_route: Option<Route>,
    pub notification: Option<String>,
}

impl ViewModel {
    pub fn progress() -> Self {
        Self {
            body: ViewBody::Progress,
            create_route: None,
            notification: None,
        }
    }

    pub fn is_progress(&self) -> bool {
        matches!(self.body, ViewBody::Progress)
    }

    pub fn table(&self) -> Option<&Table> {
        match &self.body {
            ViewBody::Table(table) => Some(table),
            _ => None,
        }
    }
}
