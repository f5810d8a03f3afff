// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for the Storefront bot.
//!
//! Implements [`ChannelAdapter`] for the Telegram Bot API via teloxide:
//! long polling for messages and button presses, HTML formatted replies
//! with inline and reply keyboards, and photos by URL.

pub mod handler;
pub mod outbound;

use std::sync::Arc;

use async_trait::async_trait;
use storefront_config::model::TelegramConfig;
use storefront_core::{
    AdapterType, ChannelAdapter, ChannelCapabilities, HealthStatus, InboundEvent, Keyboard,
    MessageId, OutboundMessage, PluginAdapter, StorefrontError,
};
use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::types::{CallbackQueryId, ChatId, InputFile, ParseMode, ReplyMarkup};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::outbound::{MAX_MESSAGE_LENGTH, split_text, to_reply_markup};

/// Telegram channel adapter implementing [`ChannelAdapter`].
pub struct TelegramChannel {
    bot: Bot,
    config: TelegramConfig,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundEvent>>,
    inbound_tx: mpsc::Sender<InboundEvent>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramChannel {
    /// Creates a new Telegram channel adapter.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: TelegramConfig) -> Result<Self, StorefrontError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            StorefrontError::Config("telegram.bot_token is required for Telegram adapter".into())
        })?;

        if token.is_empty() {
            return Err(StorefrontError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            bot,
            config,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        })
    }

    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, StorefrontError> {
        let chunks = split_text(text, MAX_MESSAGE_LENGTH);
        let last = chunks.len() - 1;
        let mut sent_id = None;
        for (i, chunk) in chunks.iter().enumerate() {
            // The keyboard goes with the final chunk.
            let markup = if i == last { keyboard.map(to_reply_markup) } else { None };
            sent_id = Some(self.send_html(chat_id, chunk, markup).await?);
        }
        sent_id.ok_or_else(|| StorefrontError::Internal("no message chunk was sent".into()))
    }

    /// Sends HTML, falling back to plain text when Telegram rejects the markup.
    async fn send_html(
        &self,
        chat_id: ChatId,
        text: &str,
        markup: Option<ReplyMarkup>,
    ) -> Result<MessageId, StorefrontError> {
        let mut request = self.bot.send_message(chat_id, text).parse_mode(ParseMode::Html);
        if let Some(markup) = markup.clone() {
            request = request.reply_markup(markup);
        }
        match request.await {
            Ok(sent) => Ok(MessageId(sent.id.0.to_string())),
            Err(e) => {
                warn!(error = %e, "HTML send failed, sending as plain text");
                let mut request = self.bot.send_message(chat_id, text);
                if let Some(markup) = markup {
                    request = request.reply_markup(markup);
                }
                let sent = request.await.map_err(|e| channel_error("failed to send message", e))?;
                Ok(MessageId(sent.id.0.to_string()))
            }
        }
    }

    /// Sends a photo by URL, degrading to a text message when the image
    /// cannot be delivered.
    async fn send_photo(
        &self,
        chat_id: ChatId,
        image: &str,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, StorefrontError> {
        let url = match reqwest::Url::parse(image) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, image, "invalid image URL, sending caption as text");
                return self.send_text(chat_id, caption, keyboard).await;
            }
        };

        let mut request = self
            .bot
            .send_photo(chat_id, InputFile::url(url))
            .caption(caption)
            .parse_mode(ParseMode::Html);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(to_reply_markup(keyboard));
        }
        match request.await {
            Ok(sent) => Ok(MessageId(sent.id.0.to_string())),
            Err(e) => {
                warn!(error = %e, image, "photo send failed, sending caption as text");
                self.send_text(chat_id, caption, keyboard).await
            }
        }
    }

    async fn answer_callback(
        &self,
        callback_id: String,
        text: Option<String>,
    ) -> Result<MessageId, StorefrontError> {
        let mut request = self.bot.answer_callback_query(CallbackQueryId(callback_id.clone()));
        if let Some(text) = text {
            request = request.text(text);
        }
        request
            .await
            .map_err(|e| channel_error("failed to answer callback query", e))?;
        Ok(MessageId(callback_id))
    }
}

fn channel_error(context: &str, e: teloxide::RequestError) -> StorefrontError {
    StorefrontError::Channel {
        message: format!("{context}: {e}"),
        source: Some(Box::new(e)),
    }
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, StorefrontError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), StorefrontError> {
        debug!("Telegram channel shutting down");
        if let Some(handle) = &self.polling_handle {
            handle.abort();
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    fn capabilities(&self) -> ChannelCapabilities {
        ChannelCapabilities {
            supports_images: true,
            supports_inline_keyboards: true,
            max_message_length: Some(MAX_MESSAGE_LENGTH),
        }
    }

    async fn connect(&mut self) -> Result<(), StorefrontError> {
        if self.polling_handle.is_some() {
            return Ok(());
        }

        let bot = self.bot.clone();
        let message_tx = self.inbound_tx.clone();
        let callback_tx = self.inbound_tx.clone();
        let allowed_users: Arc<Vec<String>> = Arc::new(self.config.allowed_users.clone());
        let allowed_for_callbacks = Arc::clone(&allowed_users);

        info!("starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let on_message = Update::filter_message().endpoint(move |msg: Message| {
                let tx = message_tx.clone();
                let allowed = allowed_users.clone();
                async move {
                    if !handler::is_dm(&msg) {
                        debug!(chat_id = msg.chat.id.0, "ignoring non-DM message");
                        return respond(());
                    }
                    if !handler::is_authorized(msg.from.as_ref(), &allowed) {
                        debug!(chat_id = msg.chat.id.0, "ignoring unauthorized user");
                        return respond(());
                    }
                    match handler::message_to_event(&msg) {
                        Some(event) => {
                            if tx.send(event).await.is_err() {
                                warn!("inbound channel closed, dropping message");
                            }
                        }
                        None => debug!(msg_id = msg.id.0, "ignoring non-text message"),
                    }
                    respond(())
                }
            });

            let on_callback = Update::filter_callback_query().endpoint(move |q: CallbackQuery| {
                let tx = callback_tx.clone();
                let allowed = allowed_for_callbacks.clone();
                async move {
                    if !handler::is_dm_callback(&q) {
                        debug!(user_id = q.from.id.0, "ignoring button press outside DM");
                        return respond(());
                    }
                    if !handler::is_authorized(Some(&q.from), &allowed) {
                        debug!(user_id = q.from.id.0, "ignoring unauthorized button press");
                        return respond(());
                    }
                    match handler::callback_to_event(&q) {
                        Some(event) => {
                            if tx.send(event).await.is_err() {
                                warn!("inbound channel closed, dropping button press");
                            }
                        }
                        None => debug!(user_id = q.from.id.0, "ignoring button press without data"),
                    }
                    respond(())
                }
            });

            let handler = dptree::entry().branch(on_message).branch(on_callback);

            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {})
                .build()
                .dispatch()
                .await;
        });

        self.polling_handle = Some(handle);
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, StorefrontError> {
        match msg {
            OutboundMessage::Text {
                chat_id,
                text,
                keyboard,
            } => self.send_text(ChatId(chat_id), &text, keyboard.as_ref()).await,
            OutboundMessage::Photo {
                chat_id,
                image,
                caption,
                keyboard,
            } => {
                self.send_photo(ChatId(chat_id), &image, &caption, keyboard.as_ref())
                    .await
            }
            OutboundMessage::Ack { callback_id, text } => {
                self.answer_callback(callback_id, text).await
            }
        }
    }

    async fn receive(&self) -> Result<InboundEvent, StorefrontError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| StorefrontError::Channel {
            message: "Telegram inbound channel closed".into(),
            source: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: Option<&str>) -> TelegramConfig {
        TelegramConfig {
            bot_token: token.map(str::to_string),
            allowed_users: vec![],
        }
    }

    #[test]
    fn new_requires_bot_token() {
        let err = TelegramChannel::new(config(None)).err().unwrap();
        assert!(err.to_string().contains("bot_token"));
    }

    #[test]
    fn new_rejects_empty_token() {
        assert!(TelegramChannel::new(config(Some(""))).is_err());
    }

    #[test]
    fn new_accepts_valid_token() {
        assert!(TelegramChannel::new(config(Some("123456:ABC-DEF1234ghIkl-zyx57W2v1u123ew11"))).is_ok());
    }

    #[test]
    fn capabilities_are_correct() {
        let channel = TelegramChannel::new(config(Some("test:token"))).unwrap();
        let caps = channel.capabilities();
        assert!(caps.supports_images);
        assert!(caps.supports_inline_keyboards);
        assert_eq!(caps.max_message_length, Some(4096));
    }

    #[test]
    fn plugin_adapter_metadata() {
        let channel = TelegramChannel::new(config(Some("test:token"))).unwrap();
        assert_eq!(channel.name(), "telegram");
        assert_eq!(channel.version(), semver::Version::new(0, 1, 0));
        assert_eq!(channel.adapter_type(), AdapterType::Channel);
    }

    #[tokio::test]
    async fn receive_returns_forwarded_events() {
        let channel = TelegramChannel::new(config(Some("test:token"))).unwrap();
        let event = InboundEvent::TextMessage {
            user_id: 1,
            chat_id: 1,
            text: "/start".into(),
            username: None,
        };
        channel.inbound_tx.send(event.clone()).await.unwrap();
        assert_eq!(channel.receive().await.unwrap(), event);
    }
}
