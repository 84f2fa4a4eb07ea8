//! Button events and subscriptions
//!
//! Every button owns an [`EventBus`]. Listeners subscribe per [`EventKind`] with a
//! callback, or receive every event through a broadcast channel.

use crate::types::TransactionStatus;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

/// Kind of event emitted by a button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventKind {
    /// The checkout overlay was opened
    #[serde(rename = "onOpenPaymentWindow")]
    OpenPaymentWindow,
    /// The checkout overlay was closed
    #[serde(rename = "onClosePaymentWindow")]
    ClosePaymentWindow,
    /// A new transaction status was received
    #[serde(rename = "onUpdated")]
    Updated,
    /// The payment was accepted
    #[serde(rename = "onPaymentAccepted")]
    PaymentAccepted,
}

impl EventKind {
    /// Name of the custom event dispatched on the container
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::OpenPaymentWindow => "onOpenPaymentWindow",
            EventKind::ClosePaymentWindow => "onClosePaymentWindow",
            EventKind::Updated => "onUpdated",
            EventKind::PaymentAccepted => "onPaymentAccepted",
        }
    }

    /// Look up an event kind by its custom event name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "onOpenPaymentWindow" => Some(EventKind::OpenPaymentWindow),
            "onClosePaymentWindow" => Some(EventKind::ClosePaymentWindow),
            "onUpdated" => Some(EventKind::Updated),
            "onPaymentAccepted" => Some(EventKind::PaymentAccepted),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event emitted by a button
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonEvent {
    /// Kind of event
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Transaction snapshot carried by update and acceptance events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<TransactionStatus>,
    /// When the event was emitted
    pub timestamp: DateTime<Utc>,
}

impl ButtonEvent {
    /// Create an event without detail
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            detail: None,
            timestamp: Utc::now(),
        }
    }

    /// Create an event carrying a transaction snapshot
    pub fn with_detail(kind: EventKind, detail: TransactionStatus) -> Self {
        Self {
            detail: Some(detail),
            ..Self::new(kind)
        }
    }
}

/// Callback invoked for matching events
pub type EventCallback = Arc<dyn Fn(&ButtonEvent) + Send + Sync>;

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Event listeners of a single button
pub struct EventBus {
    listeners: Mutex<HashMap<EventKind, Vec<(SubscriptionId, EventCallback)>>>,
    next_id: AtomicU64,
    sender: broadcast::Sender<ButtonEvent>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners: usize = self.listeners.lock().values().map(Vec::len).sum();
        f.debug_struct("EventBus")
            .field("listeners", &listeners)
            .field("channel_receivers", &self.sender.receiver_count())
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create an event bus without listeners
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            listeners: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            sender,
        }
    }

    /// Register a callback for one kind of event
    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: Fn(&ButtonEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let callback: EventCallback = Arc::new(callback);
        self.listeners
            .lock()
            .entry(kind)
            .or_default()
            .push((id, callback));
        id
    }

    /// Remove a callback; returns whether it was registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock();
        for callbacks in listeners.values_mut() {
            if let Some(index) = callbacks.iter().position(|(existing, _)| *existing == id) {
                callbacks.remove(index);
                return true;
            }
        }
        false
    }

    /// Receive every event emitted from now on
    pub fn channel(&self) -> broadcast::Receiver<ButtonEvent> {
        self.sender.subscribe()
    }

    /// Deliver an event to matching callbacks and channel receivers
    pub fn emit(&self, event: &ButtonEvent) {
        // Callbacks run without the lock so they may subscribe or unsubscribe.
        let callbacks: Vec<EventCallback> = self
            .listeners
            .lock()
            .get(&event.kind)
            .map(|callbacks| callbacks.iter().map(|(_, cb)| Arc::clone(cb)).collect())
            .unwrap_or_default();

        for callback in callbacks {
            callback(event);
        }

        // Sending only fails when nobody listens on the channel.
        let _ = self.sender.send(event.clone());
    }
}
