// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Storefront bot.
//!
//! Holds the error enum, the shop's domain types, the channel-agnostic
//! event types and the adapter traits every other crate builds on.

pub mod domain;
pub mod error;
pub mod event;
pub mod time;
pub mod traits;
pub mod types;

pub use domain::{
    Category, NewPost, NewProduct, Notification, OrderItem, OrderStatus, OrderSummary,
    PickupPoint, PlacedOrder, Post, PostKind, Product, ProductField, ProductUpdate, SalesRow,
    UserProfile, parse_min_qty, parse_price,
};
pub use error::StorefrontError;
pub use event::{Button, InboundEvent, Keyboard, OutboundMessage};
pub use types::{AdapterType, ChannelCapabilities, HealthStatus, MessageId};

pub use traits::{
    CatalogStore, ChannelAdapter, ContentStore, NotificationStore, OrderStore, PluginAdapter,
    ProfileStore, StorageAdapter,
};
