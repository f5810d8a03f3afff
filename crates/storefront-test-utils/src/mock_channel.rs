// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic testing.
//!
//! `MockChannel` implements `ChannelAdapter` with injectable inbound events
//! and captured outbound messages for assertion in tests.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use storefront_core::{
    AdapterType, ChannelAdapter, ChannelCapabilities, HealthStatus, InboundEvent, MessageId,
    OutboundMessage, PluginAdapter, StorefrontError,
};

/// A mock messaging channel for testing.
///
/// Provides two queues:
/// - **inbound**: events injected via `inject()` are returned by `receive()`
/// - **sent**: messages passed to `send()` are captured and retrievable via `sent_messages()`
///
/// After `close()`, `receive()` drains the queue and then reports the channel
/// as closed.
pub struct MockChannel {
    inbound: Arc<Mutex<VecDeque<InboundEvent>>>,
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    notify: Arc<Notify>,
    sent_notify: Arc<Notify>,
    closed: AtomicBool,
    fail_sends: AtomicBool,
    stalled_chats: Mutex<HashSet<i64>>,
    released: Notify,
    next_id: AtomicU64,
}

impl MockChannel {
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
            notify: Arc::new(Notify::new()),
            sent_notify: Arc::new(Notify::new()),
            closed: AtomicBool::new(false),
            fail_sends: AtomicBool::new(false),
            stalled_chats: Mutex::new(HashSet::new()),
            released: Notify::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Queue an inbound event for `receive()`.
    pub async fn inject(&self, event: InboundEvent) {
        self.inbound.lock().await.push_back(event);
        self.notify.notify_one();
    }

    /// Stop accepting events once the queue is drained.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    /// Make every subsequent `send()` fail.
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Make `send()` to `chat_id` hang until [`release_stalled`](Self::release_stalled).
    pub async fn stall_chat(&self, chat_id: i64) {
        self.stalled_chats.lock().await.insert(chat_id);
    }

    /// Let every stalled `send()` continue.
    pub async fn release_stalled(&self) {
        self.stalled_chats.lock().await.clear();
        self.released.notify_waiters();
    }

    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }

    /// Waits until at least `count` messages were sent, or `timeout` elapses.
    /// Returns the captured messages either way.
    pub async fn wait_for_sent(&self, count: usize, timeout: Duration) -> Vec<OutboundMessage> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.sent_notify.notified();
            {
                let sent = self.sent.lock().await;
                if sent.len() >= count {
                    return sent.clone();
                }
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.sent_messages().await;
            }
        }
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, StorefrontError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), StorefrontError> {
        self.close();
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    fn capabilities(&self) -> ChannelCapabilities {
        ChannelCapabilities {
            supports_images: true,
            supports_inline_keyboards: true,
            max_message_length: None,
        }
    }

    async fn connect(&mut self) -> Result<(), StorefrontError> {
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, StorefrontError> {
        if let Some(chat_id) = msg.chat_id() {
            loop {
                let released = self.released.notified();
                if !self.stalled_chats.lock().await.contains(&chat_id) {
                    break;
                }
                released.await;
            }
        }
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(StorefrontError::Channel {
                message: "mock send failure".into(),
                source: None,
            });
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.sent.lock().await.push(msg);
        self.sent_notify.notify_waiters();
        Ok(MessageId(format!("mock-msg-{id}")))
    }

    async fn receive(&self) -> Result<InboundEvent, StorefrontError> {
        loop {
            let notified = self.notify.notified();
            {
                let mut queue = self.inbound.lock().await;
                if let Some(event) = queue.pop_front() {
                    return Ok(event);
                }
            }
            if self.closed.load(Ordering::SeqCst) {
                return Err(StorefrontError::Channel {
                    message: "mock channel closed".into(),
                    source: None,
                });
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(user_id: i64, text: &str) -> InboundEvent {
        InboundEvent::TextMessage {
            user_id,
            chat_id: user_id,
            text: text.into(),
            username: None,
        }
    }

    #[tokio::test]
    async fn receive_returns_injected_events_in_order() {
        let channel = MockChannel::new();
        channel.inject(text(1, "first")).await;
        channel.inject(text(1, "second")).await;

        assert_eq!(channel.receive().await.unwrap(), text(1, "first"));
        assert_eq!(channel.receive().await.unwrap(), text(1, "second"));
    }

    #[tokio::test]
    async fn send_captures_outbound_messages() {
        let channel = MockChannel::new();
        let id = channel.send(OutboundMessage::text(5, "hi")).await.unwrap();
        assert!(id.0.starts_with("mock-msg-"));
        assert_eq!(channel.sent_messages().await, vec![OutboundMessage::text(5, "hi")]);
    }

    #[tokio::test]
    async fn closed_channel_drains_then_reports_closed() {
        let channel = MockChannel::new();
        channel.inject(text(1, "last")).await;
        channel.close();

        assert!(channel.receive().await.is_ok());
        let err = channel.receive().await.unwrap_err();
        assert!(err.is_channel_closed());
    }

    #[tokio::test]
    async fn failing_sends_capture_nothing() {
        let channel = MockChannel::new();
        channel.set_fail_sends(true);
        assert!(channel.send(OutboundMessage::text(1, "x")).await.is_err());
        assert_eq!(channel.sent_count().await, 0);
    }

    #[tokio::test]
    async fn stalled_chat_waits_for_release() {
        let channel = Arc::new(MockChannel::new());
        channel.stall_chat(9).await;
        let sender = Arc::clone(&channel);
        let handle = tokio::spawn(async move { sender.send(OutboundMessage::text(9, "held")).await });

        channel.send(OutboundMessage::text(3, "free")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(channel.sent_messages().await, vec![OutboundMessage::text(3, "free")]);

        channel.release_stalled().await;
        handle.await.unwrap().unwrap();
        assert_eq!(channel.sent_count().await, 2);
    }

    #[tokio::test]
    async fn receive_wakes_on_inject() {
        let channel = Arc::new(MockChannel::new());
        let reader = Arc::clone(&channel);
        let handle = tokio::spawn(async move { reader.receive().await });
        tokio::task::yield_now().await;
        channel.inject(text(2, "late")).await;
        assert_eq!(handle.await.unwrap().unwrap(), text(2, "late"));
    }
}
