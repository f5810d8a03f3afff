// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use storefront_config::model::StorageConfig;
use storefront_core::{
    AdapterType, CatalogStore, Category, ContentStore, HealthStatus, NewPost, NewProduct,
    Notification, NotificationStore, OrderItem, OrderStore, OrderSummary, PickupPoint,
    PlacedOrder, PluginAdapter, Post, Product, ProductUpdate, ProfileStore, SalesRow,
    StorageAdapter, StorefrontError, UserProfile,
};

use crate::database::{map_tr_err, Database};
use crate::queries::{catalog, content, notifications, orders, profiles};

/// SQLite-backed storage adapter.
///
/// The database is opened by [`StorageAdapter::initialize`]; every store
/// method fails with a storage error before that.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wrap an already opened database (used by tests and in-memory setups).
    pub fn from_database(config: StorageConfig, db: Database) -> Self {
        Self {
            config,
            db: OnceCell::new_with(Some(db)),
        }
    }

    fn db(&self) -> Result<&Database, StorefrontError> {
        self.db.get().ok_or_else(|| StorefrontError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    async fn checkpoint(db: &Database) -> Result<(), StorefrontError> {
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, StorefrontError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), StorefrontError> {
        if let Some(db) = self.db.get() {
            Self::checkpoint(db).await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), StorefrontError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| StorefrontError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), StorefrontError> {
        Self::checkpoint(self.db()?).await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for SqliteStorage {
    async fn add_category(&self, name: &str) -> Result<i64, StorefrontError> {
        catalog::add_category(self.db()?, name).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StorefrontError> {
        catalog::list_categories(self.db()?).await
    }

    async fn get_category(&self, id: i64) -> Result<Option<Category>, StorefrontError> {
        catalog::get_category(self.db()?, id).await
    }

    async fn delete_category(&self, id: i64) -> Result<(), StorefrontError> {
        catalog::delete_category(self.db()?, id).await
    }

    async fn add_product(&self, product: NewProduct) -> Result<i64, StorefrontError> {
        catalog::add_product(self.db()?, product).await
    }

    async fn list_products(&self, category_id: i64) -> Result<Vec<Product>, StorefrontError> {
        catalog::list_products(self.db()?, category_id).await
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>, StorefrontError> {
        catalog::get_product(self.db()?, id).await
    }

    async fn update_product(
        &self,
        id: i64,
        update: ProductUpdate,
    ) -> Result<(), StorefrontError> {
        catalog::update_product(self.db()?, id, update).await
    }

    async fn delete_product(&self, id: i64) -> Result<(), StorefrontError> {
        catalog::delete_product(self.db()?, id).await
    }
}

#[async_trait]
impl ContentStore for SqliteStorage {
    async fn add_post(&self, post: NewPost) -> Result<i64, StorefrontError> {
        content::add_post(self.db()?, post).await
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StorefrontError> {
        content::list_posts(self.db()?).await
    }

    async fn list_published_posts(
        &self,
        now: &str,
        limit: usize,
    ) -> Result<Vec<Post>, StorefrontError> {
        content::list_published_posts(self.db()?, now, limit).await
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, StorefrontError> {
        content::get_post(self.db()?, id).await
    }

    async fn delete_post(&self, id: i64) -> Result<(), StorefrontError> {
        content::delete_post(self.db()?, id).await
    }

    async fn get_min_delivery_sum(&self) -> Result<f64, StorefrontError> {
        content::get_min_delivery_sum(self.db()?).await
    }

    async fn set_min_delivery_sum(&self, value: f64) -> Result<(), StorefrontError> {
        content::set_min_delivery_sum(self.db()?, value).await
    }

    async fn seed_defaults(&self, default_min_sum: f64) -> Result<(), StorefrontError> {
        content::seed_defaults(self.db()?, default_min_sum).await
    }

    async fn add_pickup_point(&self, address: &str) -> Result<i64, StorefrontError> {
        content::add_pickup_point(self.db()?, address).await
    }

    async fn list_pickup_points(&self) -> Result<Vec<PickupPoint>, StorefrontError> {
        content::list_pickup_points(self.db()?).await
    }

    async fn delete_pickup_point(&self, id: i64) -> Result<(), StorefrontError> {
        content::delete_pickup_point(self.db()?, id).await
    }
}

#[async_trait]
impl ProfileStore for SqliteStorage {
    async fn get_profile(&self, user_id: i64) -> Result<UserProfile, StorefrontError> {
        profiles::get_profile(self.db()?, user_id).await
    }

    async fn upsert_username(
        &self,
        user_id: i64,
        username: Option<&str>,
    ) -> Result<(), StorefrontError> {
        profiles::upsert_username(self.db()?, user_id, username).await
    }

    async fn set_phone(&self, user_id: i64, phone: &str) -> Result<(), StorefrontError> {
        profiles::set_phone(self.db()?, user_id, phone).await
    }

    async fn set_address(&self, user_id: i64, address: &str) -> Result<(), StorefrontError> {
        profiles::set_address(self.db()?, user_id, address).await
    }
}

#[async_trait]
impl OrderStore for SqliteStorage {
    async fn place_order(
        &self,
        user_id: i64,
        chat_id: Option<i64>,
        lines: &[(i64, u32)],
    ) -> Result<Option<PlacedOrder>, StorefrontError> {
        orders::place_order(self.db()?, user_id, chat_id, lines).await
    }

    async fn list_orders_by_status(
        &self,
        status: &str,
        limit: usize,
    ) -> Result<Vec<OrderSummary>, StorefrontError> {
        orders::list_orders_by_status(self.db()?, status, limit).await
    }

    async fn list_orders_by_user(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<OrderSummary>, StorefrontError> {
        orders::list_orders_by_user(self.db()?, user_id, limit).await
    }

    async fn get_order(&self, id: i64) -> Result<Option<OrderSummary>, StorefrontError> {
        orders::get_order(self.db()?, id).await
    }

    async fn get_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, StorefrontError> {
        orders::get_order_items(self.db()?, order_id).await
    }

    async fn update_order_status(&self, id: i64, status: &str) -> Result<bool, StorefrontError> {
        orders::update_order_status(self.db()?, id, status).await
    }

    async fn sales_by_product(
        &self,
        start: &str,
        end: &str,
        limit: Option<usize>,
    ) -> Result<Vec<SalesRow>, StorefrontError> {
        orders::sales_by_product(self.db()?, start, end, limit).await
    }
}

#[async_trait]
impl NotificationStore for SqliteStorage {
    async fn schedule_notification(
        &self,
        chat_id: i64,
        text: &str,
        send_at: &str,
    ) -> Result<i64, StorefrontError> {
        notifications::schedule_notification(self.db()?, chat_id, text, send_at).await
    }

    async fn fetch_due_notifications(
        &self,
        now: &str,
    ) -> Result<Vec<Notification>, StorefrontError> {
        notifications::fetch_due_notifications(self.db()?, now).await
    }

    async fn list_pending_notifications(&self) -> Result<Vec<Notification>, StorefrontError> {
        notifications::list_pending_notifications(self.db()?).await
    }
}
