// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel-agnostic inbound events and outbound messages.

use serde::{Deserialize, Serialize};

/// An event delivered by a messaging channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// The user pressed an inline button carrying a command payload.
    ActionPress {
        user_id: i64,
        chat_id: i64,
        command: String,
        callback_id: Option<String>,
        username: Option<String>,
    },
    /// The user sent free text.
    TextMessage {
        user_id: i64,
        chat_id: i64,
        text: String,
        username: Option<String>,
    },
}

impl InboundEvent {
    pub fn user_id(&self) -> i64 {
        match self {
            Self::ActionPress { user_id, .. } | Self::TextMessage { user_id, .. } => *user_id,
        }
    }

    pub fn chat_id(&self) -> i64 {
        match self {
            Self::ActionPress { chat_id, .. } | Self::TextMessage { chat_id, .. } => *chat_id,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Self::ActionPress { username, .. } | Self::TextMessage { username, .. } => {
                username.as_deref()
            }
        }
    }

    /// Short label used for logging and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ActionPress { .. } => "action",
            Self::TextMessage { .. } => "text",
        }
    }
}

/// An inline button with a command payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub command: String,
}

impl Button {
    pub fn new(label: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            command: command.into(),
        }
    }
}

/// Keyboard attached to an outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "rows", rename_all = "snake_case")]
pub enum Keyboard {
    /// Buttons rendered under the message.
    Inline(Vec<Vec<Button>>),
    /// Persistent reply keyboard of text labels.
    Menu(Vec<Vec<String>>),
}

impl Keyboard {
    /// Builds an inline keyboard with one button per row.
    pub fn column(buttons: impl IntoIterator<Item = Button>) -> Self {
        Self::Inline(buttons.into_iter().map(|b| vec![b]).collect())
    }
}

/// A message the engine wants delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// HTML-formatted text.
    Text {
        chat_id: i64,
        text: String,
        keyboard: Option<Keyboard>,
    },
    /// Image by URL with an HTML caption.
    Photo {
        chat_id: i64,
        image: String,
        caption: String,
        keyboard: Option<Keyboard>,
    },
    /// Acknowledgement of a button press, optionally with a toast.
    Ack {
        callback_id: String,
        text: Option<String>,
    },
}

impl OutboundMessage {
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self::Text {
            chat_id,
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(chat_id: i64, text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self::Text {
            chat_id,
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }

    /// Target chat, or `None` for acknowledgements.
    pub fn chat_id(&self) -> Option<i64> {
        match self {
            Self::Text { chat_id, .. } | Self::Photo { chat_id, .. } => Some(*chat_id),
            Self::Ack { .. } => None,
        }
    }

    /// Visible body: the text or the photo caption.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            Self::Photo { caption, .. } => Some(caption),
            Self::Ack { text, .. } => text.as_deref(),
        }
    }

    pub fn keyboard(&self) -> Option<&Keyboard> {
        match self {
            Self::Text { keyboard, .. } | Self::Photo { keyboard, .. } => keyboard.as_ref(),
            Self::Ack { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_accessors() {
        let ev = InboundEvent::ActionPress {
            user_id: 7,
            chat_id: 70,
            command: "cats".into(),
            callback_id: Some("cb".into()),
            username: Some("ann".into()),
        };
        assert_eq!(ev.user_id(), 7);
        assert_eq!(ev.chat_id(), 70);
        assert_eq!(ev.username(), Some("ann"));
        assert_eq!(ev.kind(), "action");
    }

    #[test]
    fn outbound_serializes_with_tag() {
        let msg = OutboundMessage::with_keyboard(
            1,
            "hi",
            Keyboard::column([Button::new("Catalog", "cats")]),
        );
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["keyboard"]["type"], "inline");
        assert_eq!(json["keyboard"]["rows"][0][0]["command"], "cats");
    }

    #[test]
    fn ack_has_no_chat() {
        let ack = OutboundMessage::Ack {
            callback_id: "x".into(),
            text: None,
        };
        assert_eq!(ack.chat_id(), None);
        assert_eq!(ack.body(), None);
        assert!(ack.keyboard().is_none());
    }
}
