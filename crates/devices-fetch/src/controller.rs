use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use devices_core::{
    ActivationId, DevicesLoader, Effect, FieldClassification, LoadState, LoaderEvent,
    SchemaStrategy, ViewModel,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::notify::Notifier;
use crate::source::DeviceSource;

/// Coarse load state, published whenever the loader transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadPhase {
    Loading,
    Ready,
    Failed,
}

impl LoadPhase {
    fn of(state: &LoadState) -> Self {
        match state {
            LoadState::Loading => LoadPhase::Loading,
            LoadState::Ready(_) => LoadPhase::Ready,
            LoadState::Failed(_) => LoadPhase::Failed,
        }
    }
}

/// Runs the device list's load-state machine against a [`DeviceSource`].
///
/// Must be used from within a tokio runtime: every activation spawns one fetch task. Dropping the
/// controller aborts any fetch still in flight.
pub struct DevicesController<S, N> {
    shared: Arc<Shared<S, N>>,
}

struct Shared<S, N> {
    source: S,
    notifier: N,
    classification: FieldClassification,
    strategy: SchemaStrategy,
    loader: Mutex<DevicesLoader>,
    tasks: Mutex<HashMap<ActivationId, JoinHandle<()>>>,
    phase: watch::Sender<LoadPhase>,
}

impl<S: DeviceSource, N: Notifier> DevicesController<S, N> {
    pub fn new(source: S, notifier: N) -> Self {
        Self::with_view_options(
            source,
            notifier,
            FieldClassification::default(),
            SchemaStrategy::default(),
        )
    }

    pub fn with_view_options(
        source: S,
        notifier: N,
        classification: FieldClassification,
        strategy: SchemaStrategy,
    ) -> Self {
        let (phase, _) = watch::channel(LoadPhase::Loading);
        Self {
            shared: Arc::new(Shared {
                source,
                notifier,
                classification,
                strategy,
                loader: Mutex::new(DevicesLoader::new()),
                tasks: Mutex::new(HashMap::new()),
                phase,
            }),
        }
    }

    /// Show the view: cancel any fetch in flight and start a fresh one.
    pub fn activate(&self) -> ActivationId {
        self.shared
            .dispatch(LoaderEvent::Activate)
            .expect("activation always starts a fetch")
    }

    /// Hide the view: cancel any fetch in flight. Its result, if it still arrives, is dropped.
    pub fn deactivate(&self) {
        self.shared.dispatch(LoaderEvent::Deactivate);
    }

    pub fn phase(&self) -> LoadPhase {
        *self.shared.phase.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadPhase> {
        self.shared.phase.subscribe()
    }

    /// Wait until the current activation leaves `Loading`.
    ///
    /// Never resolves if the view was deactivated while loading.
    pub async fn settled(&self) -> LoadPhase {
        let mut rx = self.subscribe();
        let phase = match rx.wait_for(|phase| *phase != LoadPhase::Loading).await {
            Ok(phase) => *phase,
            // The sender lives in `shared`, which `self` keeps alive.
            Err(_) => self.phase(),
        };
        phase
    }

    pub fn state(&self) -> LoadState {
        self.shared
            .loader
            .lock()
            .expect("devices loader mutex poisoned")
            .state()
            .clone()
    }

    pub fn view(&self) -> ViewModel {
        self.shared
            .loader
            .lock()
            .expect("devices loader mutex poisoned")
            .view(&self.shared.classification, self.shared.strategy)
    }
}

impl<S, N> Drop for DevicesController<S, N> {
    fn drop(&mut self) {
        if let Ok(mut tasks) = self.shared.tasks.lock() {
            for (_, handle) in tasks.drain() {
                handle.abort();
            }
        }
    }
}

impl<S: DeviceSource, N: Notifier> Shared<S, N> {
    /// Apply one event and run its effects. Returns the activation whose fetch was started.
    ///
    /// Fetch tasks are started and aborted while the loader and task locks are both held, so a
    /// cancellation always finds the handle of the fetch it targets.
    fn dispatch(self: &Arc<Self>, event: LoaderEvent) -> Option<ActivationId> {
        let finished = match &event {
            LoaderEvent::FetchSucceeded { activation, .. }
            | LoaderEvent::FetchFailed { activation, .. } => Some(*activation),
            LoaderEvent::Activate | LoaderEvent::Deactivate => None,
        };

        let mut started = None;
        let mut notifications = Vec::new();
        {
            let mut loader = self.loader.lock().expect("devices loader mutex poisoned");
            let effects = loader.handle(event);
            self.phase.send_replace(LoadPhase::of(loader.state()));

            let mut tasks = self.tasks.lock().expect("devices task mutex poisoned");
            if let Some(activation) = finished {
                tasks.remove(&activation);
            }
            for effect in effects {
                match effect {
                    Effect::StartFetch(activation) => {
                        tasks.insert(activation, self.spawn_fetch(activation));
                        started = Some(activation);
                    }
                    Effect::CancelFetch(activation) => {
                        if let Some(handle) = tasks.remove(&activation) {
                            log::debug!("aborting fetch for activation {activation}");
                            handle.abort();
                        }
                    }
                    Effect::Notify(message) => notifications.push(message),
                }
            }
        }

        for message in notifications {
            self.notifier.notify(&message);
        }
        started
    }

    fn spawn_fetch(self: &Arc<Self>, activation: ActivationId) -> JoinHandle<()> {
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let event = match shared.source.fetch_devices().await {
                Ok(devices) => LoaderEvent::FetchSucceeded {
                    activation,
                    devices,
                },
                Err(err) => LoaderEvent::FetchFailed {
                    activation,
                    error: err.to_string(),
                },
            };
            shared.dispatch(event);
        })
    }
}
