// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation engine for the Storefront bot.
//!
//! [`ConversationEngine`] turns one [`InboundEvent`](storefront_core::InboundEvent)
//! into the replies to send, using the stores and the per-user session. The
//! [`EngineLoop`] feeds it from a channel adapter, the
//! [`NotificationDispatcher`] delivers scheduled notifications and the
//! [`StatusNotifier`] tells customers about order status changes.

pub mod command;
pub mod dispatcher;
pub mod engine;
pub mod event_loop;
pub mod events;
pub mod render;
pub mod shutdown;
pub mod stats;

mod admin;
mod checkout;
mod customer;

use std::sync::Arc;

use storefront_core::ChannelAdapter;

pub use command::{AdminCommand, Command, CustomerCommand, TextCommand};
pub use dispatcher::{DispatchReport, NotificationDispatcher};
pub use engine::ConversationEngine;
pub use event_loop::{EngineLoop, deliver};
pub use events::{DomainEvent, EventBus, StatusNotifier, status_notice};
pub use stats::{StatsPreset, render_report};

/// A connected channel shared by the loop, the dispatcher and the notifier.
pub type SharedChannel = Arc<dyn ChannelAdapter + Send + Sync>;
