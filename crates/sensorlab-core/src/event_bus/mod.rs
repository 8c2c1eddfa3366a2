//! # Event Bus Module
//!
//! Publish/subscribe for decoupled communication between the shell, the
//! settings controller and the live display:
//! - Publishers emit typed events without knowing subscribers
//! - Subscribers filter and receive events of interest
//! - Handlers run synchronously on the publishing thread
//! - Optional bounded history for inspection
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sensorlab_core::event_bus::{AppEvent, EventBus, EventCategory, EventFilter, SettingsEvent};
//!
//! let bus = EventBus::new();
//! bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Settings]),
//!     |event| tracing::info!("{}", event.description()),
//! );
//!
//! bus.publish(AppEvent::Settings(SettingsEvent::Cancelled)).ok();
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
