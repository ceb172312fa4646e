//! Data loading for the devices admin view.
//!
//! [`HttpDeviceSource`] performs `GET {base}/devices`. [`DevicesController`] drives the
//! `devices-core` load-state machine on a tokio runtime: one task per activation, cancelled when
//! the view is re-activated or deactivated, with failures forwarded to a [`Notifier`].

mod config;
mod controller;
mod error;
mod limits;
mod notify;
mod source;

pub use config::{
    ClientConfig, ConfigError, BASE_URL_ENV, DEFAULT_BASE_URL, MAX_BODY_BYTES_ENV, TIMEOUT_SECS_ENV,
};
pub use controller::{DevicesController, LoadPhase};
pub use error::FetchError;
pub use limits::DEFAULT_MAX_BODY_BYTES;
pub use notify::{LogNotifier, Notifier};
pub use source::{DeviceSource, HttpDeviceSource};
