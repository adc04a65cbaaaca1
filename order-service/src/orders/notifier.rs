//! Lifecycle notifications
//!
//! Delivery is best-effort. The lifecycle service logs a failed delivery and
//! keeps the committed state change.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tokio::sync::broadcast;

/// Lifecycle event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderEvent {
    /// New order for the kitchen
    OrderCreated,
    /// A cook picked the order up
    OrderAssigned,
    /// The kitchen finished; the waiter can deliver
    OrderReady,
    OrderCanceled,
    OrderStatusChanged,
}

impl fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderEvent::OrderCreated => "order_created",
            OrderEvent::OrderAssigned => "order_assigned",
            OrderEvent::OrderReady => "order_ready",
            OrderEvent::OrderCanceled => "order_canceled",
            OrderEvent::OrderStatusChanged => "order_status_changed",
        };
        f.write_str(name)
    }
}

/// Delivery target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Channel {
    Kitchen,
    Waiter(i64),
}

/// Message published on the notification bus
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub channel: Channel,
    pub event: OrderEvent,
    pub payload: Value,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification channel closed")]
    Closed,
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify_kitchen(&self, event: OrderEvent, payload: Value) -> Result<(), NotifyError>;

    async fn notify_waiter(
        &self,
        event: OrderEvent,
        payload: Value,
        waiter_id: i64,
    ) -> Result<(), NotifyError>;
}

/// `tokio::sync::broadcast` fan-out
///
/// Subscribers filter on `Notification::channel`. Publishing without
/// subscribers is not an error; slow subscribers lag and lose messages.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<Notification>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    fn publish(&self, notification: Notification) {
        let channel = notification.channel;
        let event = notification.event;
        // Err only means nobody is listening
        if self.tx.send(notification).is_err() {
            tracing::debug!(?channel, %event, "No notification subscribers");
        }
    }
}

#[async_trait]
impl NotificationSink for BroadcastNotifier {
    async fn notify_kitchen(&self, event: OrderEvent, payload: Value) -> Result<(), NotifyError> {
        self.publish(Notification {
            channel: Channel::Kitchen,
            event,
            payload,
        });
        Ok(())
    }

    async fn notify_waiter(
        &self,
        event: OrderEvent,
        payload: Value,
        waiter_id: i64,
    ) -> Result<(), NotifyError> {
        self.publish(Notification {
            channel: Channel::Waiter(waiter_id),
            event,
            payload,
        });
        Ok(())
    }
}
