//! Event Bus implementation.
//!
//! The bus is constructed by the shell and handed to the components that
//! publish, there is no global instance. Handlers run synchronously on the
//! publishing thread.

use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;
use uuid::Uuid;

use super::events::{AppEvent, EventCategory};
use crate::types::{thread_safe_rw_map, ThreadSafeRwMap};

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.to_string()[..8])
    }
}

/// Which events a handler wants
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    #[default]
    All,
    /// Events in any of these categories
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    pub fn matches(&self, event: &AppEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

type EventHandler = Box<dyn Fn(AppEvent) + Send + Sync>;

/// Configuration for the event bus
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Keep published events for [`EventBus::history`]
    pub enable_history: bool,
    /// Oldest events are dropped past this many
    pub max_history_size: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            enable_history: false,
            max_history_size: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventBusError {
    #[error("No active subscribers")]
    NoSubscribers,
}

/// Application-wide event distribution
pub struct EventBus {
    handlers: ThreadSafeRwMap<SubscriptionId, (EventFilter, EventHandler)>,
    history: Arc<RwLock<VecDeque<AppEvent>>>,
    config: EventBusConfig,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        Self {
            handlers: thread_safe_rw_map(),
            history: Arc::new(RwLock::new(VecDeque::new())),
            config,
        }
    }

    /// Publish an event to every matching handler.
    ///
    /// Returns how many handlers received it, or `NoSubscribers` when none
    /// are registered. History is recorded either way.
    pub fn publish(&self, event: AppEvent) -> Result<usize, EventBusError> {
        tracing::trace!(category = %event.category(), "{}", event.description());

        if self.config.enable_history {
            self.record(&event);
        }

        let handlers = self.handlers.read();
        if handlers.is_empty() {
            return Err(EventBusError::NoSubscribers);
        }

        let mut delivered = 0;
        for (filter, handler) in handlers.values() {
            if filter.matches(&event) {
                handler(event.clone());
                delivered += 1;
            }
        }
        Ok(delivered)
    }

    /// Register a handler. It runs on the publishing thread and must not
    /// subscribe or publish re-entrantly.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(AppEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.handlers.write().insert(id, (filter, Box::new(handler)));
        tracing::debug!("Subscription {} added", id);
        id
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Recorded events, oldest first. Empty unless history is enabled.
    pub fn history(&self) -> Vec<AppEvent> {
        self.history.read().iter().cloned().collect()
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    fn record(&self, event: &AppEvent) {
        let mut history = self.history.write();
        history.push_back(event.clone());
        while history.len() > self.config.max_history_size {
            history.pop_front();
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("config", &self.config)
            .finish()
    }
}
