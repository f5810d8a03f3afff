// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by adapter traits.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifier of a message delivered by a channel adapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Storage,
    Observability,
}

/// Capabilities reported by a channel adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelCapabilities {
    /// Whether images can be sent with a caption.
    pub supports_images: bool,
    /// Whether inline (callback) buttons are rendered.
    pub supports_inline_keyboards: bool,
    /// Maximum length of a single text message, if limited.
    pub max_message_length: Option<usize>,
}
