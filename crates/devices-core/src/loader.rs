//! Load-state machine for the device list.
//!
//! Each activation of the view starts exactly one fetch and leaves `Loading` exactly once. A new
//! activation or a deactivation cancels the fetch in flight; completions that arrive for a
//! cancelled activation are dropped. The machine performs no I/O itself: callers run the returned
//! [`Effect`]s.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classify::FieldClassification;
use crate::record::Collection;
use crate::render::{render_table, TableOutcome};
use crate::routes::Route;
use crate::schema::SchemaStrategy;
use crate::view::{ViewBody, ViewModel};

pub const FETCH_FAILED_PREFIX: &str = "Get device data failed";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivationId(pub u64);

impl fmt::Display for ActivationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LoadState {
    Loading,
    Ready(Collection),
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LoaderEvent {
    Activate,
    FetchSucceeded {
        activation: ActivationId,
        devices: Collection,
    },
    FetchFailed {
        activation: ActivationId,
        error: String,
    },
    Deactivate,
}

/// Work the caller must perform after a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    StartFetch(ActivationId),
    CancelFetch(ActivationId),
    /// Show the message through the alert collaborator.
    Notify(String),
}

#[derive(Debug)]
pub struct DevicesLoader {
    state: LoadState,
    in_flight: Option<ActivationId>,
    next_activation: u64,
}

impl Default for DevicesLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DevicesLoader {
    pub fn new() -> Self {
        Self {
            state: LoadState::Loading,
            in_flight: None,
            next_activation: 1,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Activation whose fetch is currently outstanding.
    pub fn in_flight(&self) -> Option<ActivationId> {
        self.in_flight
    }

    pub fn handle(&mut self, event: LoaderEvent) -> Vec<Effect> {
        match event {
            LoaderEvent::Activate => self.activate(),
            LoaderEvent::FetchSucceeded {
                activation,
                devices,
            } => {
                if !self.accepts(activation) {
                    return Vec::new();
                }
                log::debug!(
                    "activation {activation} loaded {} devices",
                    devices.len()
                );
                self.in_flight = None;
                self.state = LoadState::Ready(devices);
                Vec::new()
            }
            LoaderEvent::FetchFailed { activation, error } => {
                if !self.accepts(activation) {
                    return Vec::new();
                }
                let message = format!("{FETCH_FAILED_PREFIX}: {error}");
                log::error!("{message}");
                self.in_flight = None;
                self.state = LoadState::Failed(message.clone());
                vec![Effect::Notify(message)]
            }
            LoaderEvent::Deactivate => {
                let effects: Vec<Effect> =
                    self.in_flight.take().map(Effect::CancelFetch).into_iter().collect();
                log::debug!("deactivated view ({} fetches cancelled)", effects.len());
                effects
            }
        }
    }

    fn activate(&mut self) -> Vec<Effect> {
        let mut effects = Vec::with_capacity(2);
        if let Some(previous) = self.in_flight.take() {
            effects.push(Effect::CancelFetch(previous));
        }

        let activation = ActivationId(self.next_activation);
        self.next_activation += 1;
        self.in_flight = Some(activation);
        self.state = LoadState::Loading;
        log::debug!("activation {activation} started");

        effects.push(Effect::StartFetch(activation));
        effects
    }

    fn accepts(&self, activation: ActivationId) -> bool {
        let current = self.in_flight == Some(activation) && self.state.is_loading();
        if !current {
            log::debug!("dropping completion for stale activation {activation}");
        }
        current
    }

    /// Build what the view shows for the current state.
    pub fn view(
        &self,
        classification: &FieldClassification,
        strategy: SchemaStrategy,
    ) -> ViewModel {
        view_for_state(&self.state, classification, strategy)
    }
}

pub fn view_for_state(
    state: &LoadState,
    classification: &FieldClassification,
    strategy: SchemaStrategy,
) -> ViewModel {
    match state {
        LoadState::Loading => ViewModel::progress(),
        LoadState::Ready(devices) => {
            let body = match render_table(devices, classification, strategy) {
                TableOutcome::Table(table) => ViewBody::Table(table),
                TableOutcome::NoData => ViewBody::no_data(),
            };
            ViewModel {
                body,
                create_route: Some(Route::CreateDevice),
                notification: None,
            }
        }
        LoadState::Failed(message) => ViewModel {
            body: ViewBody::no_data(),
            create_route: Some(Route::CreateDevice),
            notification: Some(message.clone()),
        },
    }
}
