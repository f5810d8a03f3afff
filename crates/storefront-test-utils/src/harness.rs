// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the engine over a temporary SQLite database and a
//! [`MockChannel`], and offers helpers to drive it with text and button
//! presses the way a messaging client would.

use std::sync::Arc;

use storefront_config::model::{ShopConfig, StorageConfig};
use storefront_core::{
    ContentStore, InboundEvent, OutboundMessage, StorageAdapter, StorefrontError,
};
use storefront_engine::{ConversationEngine, EventBus, SharedChannel};
use storefront_session::SessionStore;
use storefront_storage::SqliteStorage;

use crate::mock_channel::MockChannel;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    shop: ShopConfig,
    min_delivery_sum: Option<f64>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            shop: ShopConfig::default(),
            min_delivery_sum: None,
        }
    }

    pub fn with_shop(mut self, shop: ShopConfig) -> Self {
        self.shop = shop;
        self
    }

    /// Users granted the admin panel without the demo phrase.
    pub fn with_admins(mut self, admins: Vec<i64>) -> Self {
        self.shop.admin_users = admins;
        self
    }

    pub fn with_min_delivery_sum(mut self, sum: f64) -> Self {
        self.min_delivery_sum = Some(sum);
        self
    }

    pub async fn build(self) -> Result<TestHarness, StorefrontError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| StorefrontError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let storage = SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        });
        storage.initialize().await?;
        storage
            .seed_defaults(self.shop.default_min_delivery_sum)
            .await?;
        if let Some(sum) = self.min_delivery_sum {
            storage.set_min_delivery_sum(sum).await?;
        }
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

        let events = EventBus::new();
        let engine = Arc::new(ConversationEngine::new(
            Arc::clone(&storage),
            Arc::new(SessionStore::new()),
            self.shop,
            events.clone(),
        ));

        Ok(TestHarness {
            channel: Arc::new(MockChannel::new()),
            storage,
            engine,
            events,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete engine stack over a throwaway database.
pub struct TestHarness {
    pub channel: Arc<MockChannel>,
    pub storage: Arc<dyn StorageAdapter>,
    pub engine: Arc<ConversationEngine>,
    pub events: EventBus,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with the default shop settings.
    pub async fn new() -> Result<Self, StorefrontError> {
        Self::builder().build().await
    }

    /// The mock channel as the trait object the loop and workers take.
    pub fn shared_channel(&self) -> SharedChannel {
        self.channel.clone()
    }

    /// Handles free text from `user_id`; the chat id equals the user id.
    pub async fn send_text(
        &self,
        user_id: i64,
        text: &str,
    ) -> Result<Vec<OutboundMessage>, StorefrontError> {
        self.engine.handle(text_event(user_id, text)).await
    }

    /// Handles a button press carrying `command`.
    pub async fn press(
        &self,
        user_id: i64,
        command: &str,
    ) -> Result<Vec<OutboundMessage>, StorefrontError> {
        self.engine.handle(press_event(user_id, command)).await
    }
}

pub fn text_event(user_id: i64, text: &str) -> InboundEvent {
    InboundEvent::TextMessage {
        user_id,
        chat_id: user_id,
        text: text.to_string(),
        username: Some(format!("user{user_id}")),
    }
}

pub fn press_event(user_id: i64, command: &str) -> InboundEvent {
    InboundEvent::ActionPress {
        user_id,
        chat_id: user_id,
        command: command.to_string(),
        callback_id: Some(format!("cb-{user_id}-{command}")),
        username: Some(format!("user{user_id}")),
    }
}

/// Visible bodies of `messages`, skipping silent acknowledgements.
pub fn bodies(messages: &[OutboundMessage]) -> Vec<String> {
    messages
        .iter()
        .filter_map(|m| m.body().map(str::to_string))
        .collect()
}
