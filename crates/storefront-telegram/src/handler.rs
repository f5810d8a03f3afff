// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Update filtering and conversion into channel-agnostic events.
//!
//! Only private chats are served. When an allow-list is configured, updates
//! from anyone else are dropped before they reach the engine.

use storefront_core::InboundEvent;
use teloxide::types::{CallbackQuery, ChatKind, Message, User};

/// Checks whether `user` may talk to the bot.
///
/// An empty `allowed_users` list admits everyone. Otherwise the user's
/// numeric ID or username (with or without `@`, case-insensitive) must be
/// listed. Updates without a sender never pass.
pub fn is_authorized(user: Option<&User>, allowed_users: &[String]) -> bool {
    let Some(user) = user else {
        return false;
    };
    if allowed_users.is_empty() {
        return true;
    }

    let user_id = user.id.0.to_string();
    allowed_users.iter().any(|allowed| {
        if *allowed == user_id {
            return true;
        }
        match user.username.as_deref() {
            Some(username) => {
                let allowed = allowed.strip_prefix('@').unwrap_or(allowed);
                username.eq_ignore_ascii_case(allowed)
            }
            None => false,
        }
    })
}

/// Checks whether the message comes from a private (DM) chat.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// Converts a text message into a [`InboundEvent::TextMessage`].
///
/// Returns `None` for messages without text or sender (stickers, photos,
/// channel posts).
pub fn message_to_event(msg: &Message) -> Option<InboundEvent> {
    let text = msg.text()?;
    let user = msg.from.as_ref()?;
    Some(InboundEvent::TextMessage {
        user_id: user.id.0 as i64,
        chat_id: msg.chat.id.0,
        text: text.to_string(),
        username: user.username.clone(),
    })
}

/// Converts a button press into an [`InboundEvent::ActionPress`].
///
/// Presses without data are ignored. When the originating message is not
/// attached, the reply goes to the user's private chat, whose ID equals
/// the user ID.
pub fn callback_to_event(q: &CallbackQuery) -> Option<InboundEvent> {
    let command = q.data.as_deref()?;
    let user_id = q.from.id.0 as i64;
    let chat_id = q
        .message
        .as_ref()
        .map(|m| m.chat().id.0)
        .unwrap_or(user_id);
    Some(InboundEvent::ActionPress {
        user_id,
        chat_id,
        command: command.to_string(),
        callback_id: Some(q.id.to_string()),
        username: q.from.username.clone(),
    })
}

/// Whether a callback came from a private chat. Presses on messages that
/// are no longer attached are treated as private.
pub fn is_dm_callback(q: &CallbackQuery) -> bool {
    q.message
        .as_ref()
        .map(|m| m.chat().is_private())
        .unwrap_or(true)
}
