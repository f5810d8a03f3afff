// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic delivery of scheduled notifications.
//!
//! Each tick claims the due notifications (they are marked sent in the same
//! transaction that selects them) and then sends them. A failed send is
//! logged and never retried, so every notification is delivered at most once.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use storefront_core::time::now_timestamp;
use storefront_core::{NotificationStore, OutboundMessage, StorageAdapter, StorefrontError};

use crate::SharedChannel;

/// Outcome of one dispatcher tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

pub struct NotificationDispatcher {
    storage: Arc<dyn StorageAdapter>,
    channel: SharedChannel,
    interval: Duration,
}

impl NotificationDispatcher {
    pub fn new(storage: Arc<dyn StorageAdapter>, channel: SharedChannel, interval: Duration) -> Self {
        Self {
            storage,
            channel,
            interval,
        }
    }

    /// Ticks until `cancel` fires. A tick in progress is finished first.
    pub async fn run(self, cancel: CancellationToken) {
        info!(interval_secs = self.interval.as_secs(), "notification dispatcher started");
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.tick().await {
                        warn!(error = %e, "notification tick failed");
                    }
                }
                _ = cancel.cancelled() => break,
            }
        }
        info!("notification dispatcher stopped");
    }

    /// Claims and sends everything due now.
    pub async fn tick(&self) -> Result<DispatchReport, StorefrontError> {
        let due = self.storage.fetch_due_notifications(&now_timestamp()).await?;
        let mut report = DispatchReport::default();
        if due.is_empty() {
            return Ok(report);
        }
        debug!(count = due.len(), "delivering due notifications");

        for notification in due {
            let msg = OutboundMessage::text(notification.chat_id, notification.text);
            match self.channel.send(msg).await {
                Ok(_) => {
                    report.delivered += 1;
                    #[cfg(feature = "prometheus")]
                    storefront_prometheus::record_notification("delivered");
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        error = %e,
                        notification_id = notification.id,
                        chat_id = notification.chat_id,
                        "notification delivery failed, not retried"
                    );
                    #[cfg(feature = "prometheus")]
                    storefront_prometheus::record_notification("failed");
                }
            }
        }
        info!(delivered = report.delivered, failed = report.failed, "notifications dispatched");
        Ok(report)
    }
}
