// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Storefront bot.

use thiserror::Error;

/// The primary error type used across all Storefront adapters, stores and the engine.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Channel adapter errors (connection failure, delivery failure).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A referenced row does not exist (stale button, concurrent delete).
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// User input failed validation.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Requested adapter was not configured.
    #[error("adapter not found: {adapter_type}/{name}")]
    AdapterNotFound { adapter_type: String, name: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StorefrontError {
    /// Wraps any error as a storage failure.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage {
            source: Box::new(err),
        }
    }

    /// Returns true when the channel reported that it has shut down.
    pub fn is_channel_closed(&self) -> bool {
        matches!(self, Self::Channel { message, .. } if message.contains("closed"))
    }
}
