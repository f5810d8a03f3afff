// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage traits for the shop's persistent state.
//!
//! Each store is its own trait so callers can depend on the narrowest surface.
//! [`StorageAdapter`] bundles all of them with the adapter lifecycle and is
//! what the engine holds behind an `Arc<dyn StorageAdapter>`.
//!
//! Lookups by id return `Ok(None)` for a missing row. Timestamps are
//! `YYYY-MM-DD HH:MM:SS` strings.

use async_trait::async_trait;

use crate::domain::{
    Category, NewPost, NewProduct, Notification, OrderItem, OrderSummary, PickupPoint,
    PlacedOrder, Post, Product, ProductUpdate, SalesRow, UserProfile,
};
use crate::error::StorefrontError;
use crate::traits::adapter::PluginAdapter;

/// Categories and products.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn add_category(&self, name: &str) -> Result<i64, StorefrontError>;
    async fn list_categories(&self) -> Result<Vec<Category>, StorefrontError>;
    async fn get_category(&self, id: i64) -> Result<Option<Category>, StorefrontError>;
    /// Deletes the category; its products stay with no category.
    async fn delete_category(&self, id: i64) -> Result<(), StorefrontError>;

    async fn add_product(&self, product: NewProduct) -> Result<i64, StorefrontError>;
    async fn list_products(&self, category_id: i64) -> Result<Vec<Product>, StorefrontError>;
    async fn get_product(&self, id: i64) -> Result<Option<Product>, StorefrontError>;
    /// Applies a partial update. An empty update does nothing.
    async fn update_product(&self, id: i64, update: ProductUpdate)
    -> Result<(), StorefrontError>;
    async fn delete_product(&self, id: i64) -> Result<(), StorefrontError>;
}

/// Posts, shop settings and pickup points.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn add_post(&self, post: NewPost) -> Result<i64, StorefrontError>;
    /// All posts, newest effective time first.
    async fn list_posts(&self) -> Result<Vec<Post>, StorefrontError>;
    /// Posts whose effective time is at or before `now`, newest first.
    async fn list_published_posts(
        &self,
        now: &str,
        limit: usize,
    ) -> Result<Vec<Post>, StorefrontError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, StorefrontError>;
    async fn delete_post(&self, id: i64) -> Result<(), StorefrontError>;

    /// Minimum cart total for home delivery. Missing or unparsable values read as zero.
    async fn get_min_delivery_sum(&self) -> Result<f64, StorefrontError>;
    async fn set_min_delivery_sum(&self, value: f64) -> Result<(), StorefrontError>;
    /// Inserts default settings that are not present yet.
    async fn seed_defaults(&self, default_min_sum: f64) -> Result<(), StorefrontError>;

    async fn add_pickup_point(&self, address: &str) -> Result<i64, StorefrontError>;
    async fn list_pickup_points(&self) -> Result<Vec<PickupPoint>, StorefrontError>;
    async fn delete_pickup_point(&self, id: i64) -> Result<(), StorefrontError>;
}

/// Customer contact details.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Returns the profile, creating an empty one on first reference.
    async fn get_profile(&self, user_id: i64) -> Result<UserProfile, StorefrontError>;
    async fn upsert_username(
        &self,
        user_id: i64,
        username: Option<&str>,
    ) -> Result<(), StorefrontError>;
    async fn set_phone(&self, user_id: i64, phone: &str) -> Result<(), StorefrontError>;
    async fn set_address(&self, user_id: i64, address: &str) -> Result<(), StorefrontError>;
}

/// Orders and their items.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Re-prices `lines` and writes the order atomically.
    ///
    /// Lines whose product no longer exists are skipped. Returns `None`, with
    /// nothing written, when no line survives.
    async fn place_order(
        &self,
        user_id: i64,
        chat_id: Option<i64>,
        lines: &[(i64, u32)],
    ) -> Result<Option<PlacedOrder>, StorefrontError>;
    async fn list_orders_by_status(
        &self,
        status: &str,
        limit: usize,
    ) -> Result<Vec<OrderSummary>, StorefrontError>;
    async fn list_orders_by_user(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<OrderSummary>, StorefrontError>;
    async fn get_order(&self, id: i64) -> Result<Option<OrderSummary>, StorefrontError>;
    async fn get_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, StorefrontError>;
    /// Overwrites the status. Returns false when the order does not exist.
    async fn update_order_status(&self, id: i64, status: &str) -> Result<bool, StorefrontError>;
    /// Per-product totals for orders created within `[start, end]`.
    async fn sales_by_product(
        &self,
        start: &str,
        end: &str,
        limit: Option<usize>,
    ) -> Result<Vec<SalesRow>, StorefrontError>;
}

/// Scheduled outbound notifications.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn schedule_notification(
        &self,
        chat_id: i64,
        text: &str,
        send_at: &str,
    ) -> Result<i64, StorefrontError>;
    /// Selects unsent notifications due at `now` and marks them sent in the
    /// same transaction.
    async fn fetch_due_notifications(
        &self,
        now: &str,
    ) -> Result<Vec<Notification>, StorefrontError>;
    async fn list_pending_notifications(&self) -> Result<Vec<Notification>, StorefrontError>;
}

/// A storage backend providing every store.
#[async_trait]
pub trait StorageAdapter:
    PluginAdapter + CatalogStore + ContentStore + ProfileStore + OrderStore + NotificationStore
{
    /// Initializes the storage backend (connection, migrations).
    async fn initialize(&self) -> Result<(), StorefrontError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), StorefrontError>;
}
