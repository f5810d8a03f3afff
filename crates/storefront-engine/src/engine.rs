// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversation engine: routes one inbound event to a handler.
//!
//! Routing precedence:
//! 1. `admin:` button payloads, gated by admin access;
//! 2. other button payloads;
//! 3. free text: recognised text commands, then the active flow, then the
//!    main menu.
//!
//! The per-user session lock is held for the whole event, so events of one
//! user are handled strictly in order. Replies are returned to the caller and
//! sent after the lock is released.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use storefront_config::model::ShopConfig;
use storefront_core::{
    InboundEvent, Keyboard, OutboundMessage, ProfileStore, StorageAdapter, StorefrontError,
};
use storefront_session::{Flow, SessionStore, UserSession};

use crate::command::{Command, TextCommand};
use crate::events::EventBus;
use crate::render;

/// Who sent the event and where replies go.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Ctx {
    pub user_id: i64,
    pub chat_id: i64,
}

/// Messages produced by a handler, plus an optional toast for the button press.
#[derive(Debug, Default)]
pub(crate) struct Reply {
    pub messages: Vec<OutboundMessage>,
    pub toast: Option<String>,
}

impl Reply {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn message(msg: OutboundMessage) -> Self {
        Self {
            messages: vec![msg],
            toast: None,
        }
    }

    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self::message(OutboundMessage::text(chat_id, text))
    }

    pub fn keyboard(chat_id: i64, text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self::message(OutboundMessage::with_keyboard(chat_id, text, keyboard))
    }

    pub fn toast(text: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            toast: Some(text.into()),
        }
    }

    pub fn push(mut self, msg: OutboundMessage) -> Self {
        self.messages.push(msg);
        self
    }

    pub fn with_toast(mut self, text: impl Into<String>) -> Self {
        self.toast = Some(text.into());
        self
    }

    /// Button presses are acknowledged first, carrying the toast. Without a
    /// callback to answer, the toast becomes a plain message.
    fn into_messages(self, chat_id: i64, callback_id: Option<String>) -> Vec<OutboundMessage> {
        let mut out = Vec::with_capacity(self.messages.len() + 1);
        match callback_id {
            Some(callback_id) => out.push(OutboundMessage::Ack {
                callback_id,
                text: self.toast,
            }),
            None => {
                if let Some(toast) = self.toast {
                    out.push(OutboundMessage::text(chat_id, toast));
                }
            }
        }
        out.extend(self.messages);
        out
    }
}

/// Photo when `image` is a non-empty URL, text otherwise.
pub(crate) fn card(
    chat_id: i64,
    image: Option<&str>,
    caption: String,
    keyboard: Option<Keyboard>,
) -> OutboundMessage {
    match image.map(str::trim).filter(|s| !s.is_empty()) {
        Some(image) => OutboundMessage::Photo {
            chat_id,
            image: image.to_string(),
            caption,
            keyboard,
        },
        None => OutboundMessage::Text {
            chat_id,
            text: caption,
            keyboard,
        },
    }
}

/// Handles inbound events against the stores and the session state.
pub struct ConversationEngine {
    pub(crate) storage: Arc<dyn StorageAdapter>,
    pub(crate) sessions: Arc<SessionStore>,
    pub(crate) shop: ShopConfig,
    pub(crate) events: EventBus,
}

impl ConversationEngine {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        sessions: Arc<SessionStore>,
        shop: ShopConfig,
        events: EventBus,
    ) -> Self {
        Self {
            storage,
            sessions,
            shop,
            events,
        }
    }

    pub fn storage(&self) -> &Arc<dyn StorageAdapter> {
        &self.storage
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn shop(&self) -> &ShopConfig {
        &self.shop
    }

    /// Handles one event and returns the replies to deliver, in order.
    ///
    /// On error the user's flow slot is cleared so a half-finished dialogue
    /// cannot be resumed against inconsistent state.
    pub async fn handle(&self, event: InboundEvent) -> Result<Vec<OutboundMessage>, StorefrontError> {
        let started = Instant::now();
        let kind = event.kind();
        let user_id = event.user_id();

        let handle = self.sessions.session(user_id);
        let mut session = handle.lock().await;

        let result = match event {
            InboundEvent::ActionPress {
                user_id,
                chat_id,
                command,
                callback_id,
                ..
            } => {
                let ctx = Ctx { user_id, chat_id };
                self.on_action(ctx, &mut session, &command)
                    .await
                    .map(|reply| reply.into_messages(chat_id, callback_id))
            }
            InboundEvent::TextMessage {
                user_id,
                chat_id,
                text,
                username,
            } => {
                let ctx = Ctx { user_id, chat_id };
                self.on_text(ctx, &mut session, &text, username.as_deref())
                    .await
                    .map(|reply| reply.into_messages(chat_id, None))
            }
        };

        if let Err(e) = &result {
            if let Some(flow) = session.take_flow() {
                warn!(error = %e, user_id, flow = flow.name(), "handler failed, flow cleared");
            }
        }
        drop(session);

        debug!(
            user_id,
            kind,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "event handled"
        );
        #[cfg(feature = "prometheus")]
        {
            storefront_prometheus::record_event(kind);
            storefront_prometheus::record_handle_latency(started.elapsed().as_secs_f64());
        }

        result
    }

    /// Replies sent when [`handle`](Self::handle) failed.
    pub fn failure_reply(event: &InboundEvent) -> Vec<OutboundMessage> {
        match event {
            InboundEvent::ActionPress {
                callback_id: Some(callback_id),
                ..
            } => vec![OutboundMessage::Ack {
                callback_id: callback_id.clone(),
                text: Some("Error, please try again".into()),
            }],
            _ => vec![OutboundMessage::text(
                event.chat_id(),
                "Something went wrong. Please try again.",
            )],
        }
    }

    /// Configured admins and users who sent the demo phrase.
    pub fn has_admin_access(&self, user_id: i64) -> bool {
        self.shop.admin_users.contains(&user_id) || self.sessions.is_granted(user_id)
    }

    pub(crate) fn main_menu(&self, user_id: i64) -> Keyboard {
        render::main_menu(self.sessions.is_granted(user_id))
    }

    pub(crate) fn currency(&self) -> &str {
        &self.shop.currency
    }

    fn access_hint(&self) -> String {
        match self.shop.demo_admin_phrase.as_deref() {
            Some(phrase) => format!(
                "⛔ Access is granted after sending: {}",
                render::escape_html(phrase)
            ),
            None => "⛔ Admin access required.".to_string(),
        }
    }

    async fn on_action(
        &self,
        ctx: Ctx,
        session: &mut UserSession,
        payload: &str,
    ) -> Result<Reply, StorefrontError> {
        match Command::parse(payload) {
            Command::Admin(cmd) => {
                if !self.has_admin_access(ctx.user_id) {
                    debug!(user_id = ctx.user_id, payload, "admin action without access");
                    return Ok(Reply::text(ctx.chat_id, self.access_hint()));
                }
                self.admin_action(ctx, session, cmd).await
            }
            Command::Customer(cmd) => self.customer_action(ctx, session, cmd).await,
        }
    }

    async fn on_text(
        &self,
        ctx: Ctx,
        session: &mut UserSession,
        text: &str,
        username: Option<&str>,
    ) -> Result<Reply, StorefrontError> {
        if let Some(cmd) = TextCommand::parse(text, self.shop.demo_admin_phrase.as_deref()) {
            return self.text_command(ctx, session, cmd, username).await;
        }

        let Some(flow) = session.take_flow() else {
            return Ok(Reply::keyboard(
                ctx.chat_id,
                "Choose a section:",
                self.main_menu(ctx.user_id),
            ));
        };

        // Access may have been revoked since the flow started.
        if flow.is_admin() && !self.has_admin_access(ctx.user_id) {
            debug!(user_id = ctx.user_id, flow = flow.name(), "admin flow dropped without access");
            return Ok(Reply::text(ctx.chat_id, self.access_hint()));
        }

        match flow {
            Flow::AddCategory => self.add_category_step(ctx, session, text).await,
            Flow::AddProduct { category_id, step } => {
                self.add_product_step(ctx, session, category_id, step, text)
                    .await
            }
            Flow::EditProduct { product_id, field } => {
                self.edit_product_step(ctx, session, product_id, field, text)
                    .await
            }
            Flow::AddPost { kind, step } => self.add_post_step(ctx, session, kind, step, text).await,
            Flow::SetMinimumSum => self.minimum_sum_step(ctx, session, text).await,
            Flow::AddPickupPoint => self.pickup_point_step(ctx, session, text).await,
            Flow::CheckoutPhone { home_delivery } => {
                self.checkout_phone_step(ctx, session, home_delivery, text)
                    .await
            }
            Flow::CheckoutAddress => self.checkout_address_step(ctx, session, text).await,
            Flow::CheckoutPickup => {
                session.start(Flow::CheckoutPickup);
                Ok(Reply::text(
                    ctx.chat_id,
                    "Please choose a pickup point with the buttons above.",
                ))
            }
            Flow::EditPhone | Flow::EditAddress => {
                self.profile_edit_step(ctx, session, flow, text).await
            }
        }
    }

    async fn text_command(
        &self,
        ctx: Ctx,
        session: &mut UserSession,
        cmd: TextCommand,
        username: Option<&str>,
    ) -> Result<Reply, StorefrontError> {
        match cmd {
            TextCommand::Start => {
                self.storage.upsert_username(ctx.user_id, username).await?;
                let greeting = match self.shop.demo_admin_phrase.as_deref() {
                    Some(phrase) => format!(
                        "Hi! This is a demo shop bot. Send <code>{}</code> to open the admin panel.",
                        render::escape_html(phrase)
                    ),
                    None => "Hi! Welcome to the shop.".to_string(),
                };
                Ok(Reply::keyboard(ctx.chat_id, greeting, self.main_menu(ctx.user_id)))
            }
            TextCommand::UnlockAdmin => {
                self.sessions.grant_admin(ctx.user_id);
                info!(user_id = ctx.user_id, "demo admin mode enabled");
                Ok(Reply::keyboard(
                    ctx.chat_id,
                    "✅ Demo admin mode enabled",
                    self.main_menu(ctx.user_id),
                )
                .push(OutboundMessage::with_keyboard(
                    ctx.chat_id,
                    render::ADMIN_TITLE,
                    render::admin_menu(),
                )))
            }
            TextCommand::OpenAdmin => {
                if !self.has_admin_access(ctx.user_id) {
                    return Ok(Reply::text(ctx.chat_id, self.access_hint()));
                }
                Ok(Reply::keyboard(
                    ctx.chat_id,
                    render::ADMIN_TITLE,
                    render::admin_menu(),
                ))
            }
            TextCommand::ExitAdmin => {
                self.sessions.revoke_admin(ctx.user_id);
                if session.flow.as_ref().is_some_and(Flow::is_admin) {
                    session.clear_flow();
                }
                Ok(Reply::keyboard(
                    ctx.chat_id,
                    "You left the admin panel.",
                    self.main_menu(ctx.user_id),
                ))
            }
            TextCommand::Catalog => self.show_categories(ctx).await,
            TextCommand::News => self.show_news(ctx).await,
            TextCommand::Cart => Ok(Reply::message(self.cart_view(ctx, session).await?)),
            TextCommand::Profile => self.show_profile(ctx).await,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use storefront_config::model::StorageConfig;
    use storefront_core::{CatalogStore, ContentStore};
    use storefront_storage::{Database, SqliteStorage};

    pub(crate) async fn test_engine(shop: ShopConfig) -> ConversationEngine {
        let db = Database::open_in_memory().await.unwrap();
        let storage = Arc::new(SqliteStorage::from_database(StorageConfig::default(), db));
        ConversationEngine::new(storage, Arc::new(SessionStore::new()), shop, EventBus::new())
    }

    pub(crate) fn text(user_id: i64, text: &str) -> InboundEvent {
        InboundEvent::TextMessage {
            user_id,
            chat_id: user_id * 10,
            text: text.into(),
            username: Some(format!("user{user_id}")),
        }
    }

    pub(crate) fn press(user_id: i64, command: &str) -> InboundEvent {
        InboundEvent::ActionPress {
            user_id,
            chat_id: user_id * 10,
            command: command.into(),
            callback_id: Some(format!("cb-{command}")),
            username: None,
        }
    }

    pub(crate) fn bodies(msgs: &[OutboundMessage]) -> Vec<String> {
        msgs.iter()
            .filter_map(|m| m.body().map(str::to_string))
            .collect()
    }

    #[tokio::test]
    async fn action_press_is_acknowledged_first() {
        let engine = test_engine(ShopConfig::default()).await;
        let out = engine.handle(press(1, "noop")).await.unwrap();
        assert_eq!(
            out,
            vec![OutboundMessage::Ack {
                callback_id: "cb-noop".into(),
                text: None,
            }]
        );
    }

    #[tokio::test]
    async fn unknown_payload_is_acknowledged() {
        let engine = test_engine(ShopConfig::default()).await;
        let out = engine.handle(press(1, "bogus:payload")).await.unwrap();
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0], OutboundMessage::Ack { .. }));
    }

    #[tokio::test]
    async fn admin_actions_require_access() {
        let engine = test_engine(ShopConfig::default()).await;
        let out = engine.handle(press(1, "admin:catalog")).await.unwrap();
        assert!(bodies(&out)[0].contains("demo admin"));

        engine.handle(text(1, "Demo Admin")).await.unwrap();
        assert!(engine.has_admin_access(1));
        let out = engine.handle(press(1, "admin:catalog")).await.unwrap();
        assert!(bodies(&out)[0].contains("📦 Catalog"));
    }

    #[tokio::test]
    async fn configured_admins_need_no_phrase() {
        let shop = ShopConfig {
            admin_users: vec![7],
            demo_admin_phrase: None,
            ..ShopConfig::default()
        };
        let engine = test_engine(shop).await;
        assert!(engine.has_admin_access(7));
        assert!(!engine.has_admin_access(8));
        // Without a phrase the text is not special.
        let out = engine.handle(text(8, "demo admin")).await.unwrap();
        assert_eq!(bodies(&out), vec!["Choose a section:".to_string()]);
    }

    #[tokio::test]
    async fn exit_admin_revokes_grant() {
        let engine = test_engine(ShopConfig::default()).await;
        engine.handle(text(1, "demo admin")).await.unwrap();
        engine.handle(text(1, render::MENU_EXIT_ADMIN)).await.unwrap();
        assert!(!engine.has_admin_access(1));
    }

    #[tokio::test]
    async fn exit_admin_abandons_admin_flow() {
        let engine = test_engine(ShopConfig::default()).await;
        engine.handle(text(1, "demo admin")).await.unwrap();
        engine.handle(press(1, "admin:cat:add")).await.unwrap();
        engine.handle(text(1, render::MENU_EXIT_ADMIN)).await.unwrap();

        let out = engine.handle(text(1, "Injected")).await.unwrap();
        assert_eq!(bodies(&out), vec!["Choose a section:".to_string()]);
        assert!(engine.storage.list_categories().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn revoked_grant_cannot_finish_admin_flow() {
        let engine = test_engine(ShopConfig::default()).await;
        engine.handle(text(1, "demo admin")).await.unwrap();
        engine.handle(press(1, "admin:set:minsum")).await.unwrap();
        // Revoked out of band, the slot is still set.
        engine.sessions.revoke_admin(1);

        let out = engine.handle(text(1, "500")).await.unwrap();
        assert!(bodies(&out)[0].contains("⛔"));
        assert_eq!(engine.storage.get_min_delivery_sum().await.unwrap(), 0.0);
        let handle = engine.sessions.session(1);
        assert!(handle.lock().await.flow.is_none());
    }

    #[tokio::test]
    async fn exit_admin_keeps_customer_flow() {
        let engine = test_engine(ShopConfig::default()).await;
        engine.handle(press(1, "profile:phone")).await.unwrap();
        engine.handle(text(1, render::MENU_EXIT_ADMIN)).await.unwrap();
        let handle = engine.sessions.session(1);
        assert_eq!(handle.lock().await.flow, Some(Flow::EditPhone));
    }

    #[tokio::test]
    async fn start_saves_username_and_shows_menu() {
        let engine = test_engine(ShopConfig::default()).await;
        let out = engine.handle(text(3, "/start")).await.unwrap();
        assert!(matches!(out[0].keyboard(), Some(Keyboard::Menu(_))));
        let profile = engine.storage.get_profile(3).await.unwrap();
        assert_eq!(profile.username.as_deref(), Some("user3"));
    }

    #[tokio::test]
    async fn free_text_without_flow_shows_main_menu() {
        let engine = test_engine(ShopConfig::default()).await;
        let out = engine.handle(text(1, "hello")).await.unwrap();
        assert_eq!(bodies(&out), vec!["Choose a section:".to_string()]);
    }

    #[test]
    fn toast_without_callback_becomes_text() {
        let reply = Reply::toast("Cart cleared").push(OutboundMessage::text(5, "body"));
        let out = reply.into_messages(5, None);
        assert_eq!(bodies(&out), vec!["Cart cleared".to_string(), "body".to_string()]);
    }

    #[test]
    fn failure_reply_answers_callback() {
        let out = ConversationEngine::failure_reply(&press(1, "cats"));
        assert!(matches!(&out[0], OutboundMessage::Ack { text: Some(_), .. }));
        let out = ConversationEngine::failure_reply(&text(1, "hi"));
        assert_eq!(out[0].chat_id(), Some(10));
    }

    #[test]
    fn card_uses_photo_only_with_image() {
        assert!(matches!(
            card(1, Some("https://x/img.png"), "c".into(), None),
            OutboundMessage::Photo { .. }
        ));
        assert!(matches!(card(1, Some("  "), "c".into(), None), OutboundMessage::Text { .. }));
        assert!(matches!(card(1, None, "c".into(), None), OutboundMessage::Text { .. }));
    }
}
