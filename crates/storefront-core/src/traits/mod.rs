// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! All adapters extend [`PluginAdapter`] and use `#[async_trait]` for
//! dynamic dispatch.

pub mod adapter;
pub mod channel;
pub mod storage;

pub use adapter::PluginAdapter;
pub use channel::ChannelAdapter;
pub use storage::{
    CatalogStore, ContentStore, NotificationStore, OrderStore, ProfileStore, StorageAdapter,
};
