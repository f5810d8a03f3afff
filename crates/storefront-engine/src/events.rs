// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process domain events.
//!
//! The engine publishes on an [`EventBus`] after a write succeeds; side effects
//! that must not block or fail the write (customer notices) subscribe to it.

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use storefront_core::OutboundMessage;

use crate::SharedChannel;

const DEFAULT_CAPACITY: usize = 256;

/// Something that happened to persisted shop state.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    OrderStatusChanged {
        order_id: i64,
        user_id: i64,
        chat_id: Option<i64>,
        status: String,
    },
}

/// Broadcast bus for [`DomainEvent`]s. Cloning shares the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes `event`, returning how many subscribers received it.
    ///
    /// Having no subscribers is not an error.
    pub fn publish(&self, event: DomainEvent) -> usize {
        match self.sender.send(event) {
            Ok(n) => n,
            Err(broadcast::error::SendError(event)) => {
                debug!(?event, "domain event dropped, no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

/// Text sent to a customer when an administrator changes their order status.
pub fn status_notice(order_id: i64, status: &str) -> String {
    format!(
        "Your order #{order_id}: status updated to «{}».",
        crate::render::escape_html(status)
    )
}

/// Delivers order status notices to customers.
///
/// Delivery is best effort: failures are logged and never retried.
pub struct StatusNotifier {
    channel: SharedChannel,
    receiver: broadcast::Receiver<DomainEvent>,
}

impl StatusNotifier {
    pub fn new(channel: SharedChannel, bus: &EventBus) -> Self {
        Self {
            channel,
            receiver: bus.subscribe(),
        }
    }

    pub async fn run(mut self, cancel: CancellationToken) {
        info!("status notifier started");
        loop {
            tokio::select! {
                received = self.receiver.recv() => match received {
                    Ok(event) => self.deliver(event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "status notifier lagged, notices dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = cancel.cancelled() => break,
            }
        }
        info!("status notifier stopped");
    }

    async fn deliver(&self, event: DomainEvent) {
        match event {
            DomainEvent::OrderStatusChanged {
                order_id,
                user_id,
                chat_id,
                status,
            } => {
                let Some(chat_id) = chat_id else {
                    debug!(order_id, user_id, "order has no chat, status notice skipped");
                    return;
                };
                let msg = OutboundMessage::text(chat_id, status_notice(order_id, &status));
                if let Err(e) = self.channel.send(msg).await {
                    warn!(error = %e, order_id, chat_id, "failed to deliver status notice");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changed(order_id: i64) -> DomainEvent {
        DomainEvent::OrderStatusChanged {
            order_id,
            user_id: 1,
            chat_id: Some(10),
            status: "Packing".into(),
        }
    }

    #[test]
    fn publish_without_subscribers_is_fine() {
        let bus = EventBus::new();
        assert_eq!(bus.publish(changed(1)), 0);
    }

    #[tokio::test]
    async fn every_subscriber_receives_events() {
        let bus = EventBus::with_capacity(8);
        let mut a = bus.subscribe();
        let mut b = bus.clone().subscribe();
        assert_eq!(bus.publish(changed(3)), 2);
        assert_eq!(a.recv().await.unwrap(), changed(3));
        assert_eq!(b.recv().await.unwrap(), changed(3));
    }

    #[test]
    fn notice_text() {
        assert_eq!(
            status_notice(12, "Delivering"),
            "Your order #12: status updated to «Delivering»."
        );
    }
}
