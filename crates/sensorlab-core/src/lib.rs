//! # SensorLab Core
//!
//! Core types and utilities shared by the SensorLab crates: the error
//! hierarchy, the application event bus, and shared-ownership aliases.

pub mod error;
pub mod event_bus;
pub mod types;

pub use error::{DisplayError, Error, ExportError, Result};

pub use event_bus::{
    AppEvent, DisplayEvent, ErrorEvent, ErrorSeverity, EventBus, EventBusConfig, EventBusError,
    EventCategory, EventFilter, ExportEvent, Page, SettingsEvent, SubscriptionId, UiEvent,
};

pub use types::{shared, shared_vec, ListenerList, Shared, SharedVec, ThreadSafeRwMap};
