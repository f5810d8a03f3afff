// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for messaging platform integrations.

use async_trait::async_trait;

use crate::error::StorefrontError;
use crate::event::{InboundEvent, OutboundMessage};
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChannelCapabilities, MessageId};

/// Adapter for bidirectional messaging channel integrations.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Returns the capabilities supported by this channel.
    fn capabilities(&self) -> ChannelCapabilities;

    /// Establishes a connection to the messaging platform.
    async fn connect(&mut self) -> Result<(), StorefrontError>;

    /// Sends a message through the channel.
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, StorefrontError>;

    /// Receives the next inbound event from the channel.
    ///
    /// Returns a `Channel` error whose message contains "closed" once the
    /// channel has shut down.
    async fn receive(&self) -> Result<InboundEvent, StorefrontError>;
}
