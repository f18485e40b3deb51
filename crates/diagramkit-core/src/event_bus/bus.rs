//! Event Bus implementation.
//!
//! Dispatch is synchronous: handlers run on the publishing thread, in the
//! order events are published.

use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use uuid::Uuid;

use super::events::{DiagramEvent, EventCategory};

/// Subscription handle for unsubscribing from events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Create a new unique subscription ID
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.to_string()[..8])
    }
}

/// Filter to receive only specific event types
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    /// Receive all events.
    #[default]
    All,
    /// Receive events matching any of these categories.
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    /// Check if an event matches this filter
    pub fn matches(&self, event: &DiagramEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

/// Observer callback
type EventHandler = Box<dyn Fn(&DiagramEvent) + Send + Sync>;

/// Veto callback; returning `true` cancels a cancellable event
type VetoHandler = Box<dyn Fn(&DiagramEvent) -> bool + Send + Sync>;

enum Subscriber {
    Observer(EventHandler),
    Veto(VetoHandler),
}

/// Configuration for the event bus
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Whether to keep event history.
    pub enable_history: bool,
    /// Maximum number of events to retain in history.
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

/// Notification hub for one diagram surface
pub struct EventBus {
    /// Registered handlers
    handlers: Arc<RwLock<HashMap<SubscriptionId, (EventFilter, Subscriber)>>>,
    /// Event history (optional)
    history: Arc<RwLock<VecDeque<DiagramEvent>>>,
    /// Configuration
    config: EventBusConfig,
}

impl EventBus {
    /// Create a new event bus with default configuration
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    /// Create a new event bus with custom configuration
    pub fn with_config(config: EventBusConfig) -> Self {
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
            history: Arc::new(RwLock::new(VecDeque::new())),
            config,
        }
    }

    /// Publish an event to all observers
    ///
    /// Returns the number of observers that received it. Veto handlers are
    /// not consulted.
    pub fn publish(&self, event: DiagramEvent) -> usize {
        if self.config.enable_history {
            self.add_to_history(&event);
        }

        let handlers = self.handlers.read();
        let mut delivered = 0;
        for (filter, subscriber) in handlers.values() {
            if let Subscriber::Observer(handler) = subscriber {
                if filter.matches(&event) {
                    handler(&event);
                    delivered += 1;
                }
            }
        }
        tracing::trace!("Published {} to {} observer(s)", event.description(), delivered);
        delivered
    }

    /// Ask veto handlers whether a cancellable event may proceed
    ///
    /// Returns `true` when no veto handler objects. An allowed event is
    /// then published to observers like any other; a vetoed one is not.
    pub fn publish_cancellable(&self, event: DiagramEvent) -> bool {
        let vetoed = {
            let handlers = self.handlers.read();
            event.is_cancellable()
                && handlers.values().any(|(filter, subscriber)| match subscriber {
                    Subscriber::Veto(handler) => filter.matches(&event) && handler(&event),
                    Subscriber::Observer(_) => false,
                })
        };

        if vetoed {
            tracing::debug!("Vetoed: {}", event.description());
            return false;
        }
        self.publish(event);
        true
    }

    /// Subscribe to events with an observing handler
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(&DiagramEvent) + Send + Sync + 'static,
    {
        self.insert(filter, Subscriber::Observer(Box::new(handler)))
    }

    /// Subscribe a handler that may cancel cancellable events
    pub fn subscribe_veto<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(&DiagramEvent) -> bool + Send + Sync + 'static,
    {
        self.insert(filter, Subscriber::Veto(Box::new(handler)))
    }

    fn insert(&self, filter: EventFilter, subscriber: Subscriber) -> SubscriptionId {
        let id = SubscriptionId::new();
        let mut handlers = self.handlers.write();
        handlers.insert(id, (filter, subscriber));
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Unsubscribe from events
    ///
    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write();
        let removed = handlers.remove(&id).is_some();
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    /// Get the number of active subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Get recent event history (empty unless enabled)
    pub fn history(&self) -> Vec<DiagramEvent> {
        if !self.config.enable_history {
            return Vec::new();
        }
        self.history.read().iter().cloned().collect()
    }

    /// Clear event history
    pub fn clear_history(&self) {
        self.history.write().clear();
    }

    /// Get the current configuration
    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    fn add_to_history(&self, event: &DiagramEvent) {
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
