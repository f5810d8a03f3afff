// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! rejected at startup with a diagnostic instead of silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level Storefront configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorefrontConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Shop behaviour: currency, paging, admin access.
    #[serde(default)]
    pub shop: ShopConfig,

    /// Scheduled notification dispatcher.
    #[serde(default)]
    pub dispatcher: DispatcherConfig,

    /// Prometheus exporter.
    #[serde(default)]
    pub prometheus: PrometheusConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in logs.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "storefront".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required by `serve`.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Telegram user IDs or usernames allowed to talk to the bot.
    /// Empty means everyone.
    #[serde(default)]
    pub allowed_users: Vec<String>,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("storefront").join("storefront.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("storefront.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Shop behaviour configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ShopConfig {
    /// Suffix appended to every displayed amount.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Products per catalog page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Minimum delivery sum written on first start when none is stored.
    #[serde(default)]
    pub default_min_delivery_sum: f64,

    /// Telegram user IDs with permanent admin access.
    #[serde(default)]
    pub admin_users: Vec<i64>,

    /// Phrase that unlocks the admin panel for the sender. `None` disables it.
    #[serde(default = "default_demo_admin_phrase")]
    pub demo_admin_phrase: Option<String>,

    /// Orders shown in the profile history.
    #[serde(default = "default_order_history_limit")]
    pub order_history_limit: usize,

    /// Posts shown in the news feed.
    #[serde(default = "default_news_limit")]
    pub news_limit: usize,

    /// Pickup points offered at checkout.
    #[serde(default = "default_pickup_choice_limit")]
    pub pickup_choice_limit: usize,

    /// Orders shown per status in the admin order list.
    #[serde(default = "default_admin_order_limit")]
    pub admin_order_limit: usize,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            page_size: default_page_size(),
            default_min_delivery_sum: 0.0,
            admin_users: Vec::new(),
            demo_admin_phrase: default_demo_admin_phrase(),
            order_history_limit: default_order_history_limit(),
            news_limit: default_news_limit(),
            pickup_choice_limit: default_pickup_choice_limit(),
            admin_order_limit: default_admin_order_limit(),
        }
    }
}

fn default_currency() -> String {
    "RSD".to_string()
}

fn default_page_size() -> usize {
    3
}

fn default_demo_admin_phrase() -> Option<String> {
    Some("demo admin".to_string())
}

fn default_order_history_limit() -> usize {
    10
}

fn default_news_limit() -> usize {
    10
}

fn default_pickup_choice_limit() -> usize {
    20
}

fn default_admin_order_limit() -> usize {
    50
}

/// Scheduled notification dispatcher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatcherConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Seconds between polls for due notifications.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    5
}

/// Prometheus exporter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PrometheusConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Address the scrape endpoint listens on.
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_address: default_listen_address(),
        }
    }
}

fn default_listen_address() -> String {
    "127.0.0.1:9464".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shop_defaults() {
        let shop = ShopConfig::default();
        assert_eq!(shop.currency, "RSD");
        assert_eq!(shop.page_size, 3);
        assert_eq!(shop.demo_admin_phrase.as_deref(), Some("demo admin"));
        assert_eq!(shop.admin_order_limit, 50);
        assert!(shop.admin_users.is_empty());
    }

    #[test]
    fn database_path_ends_with_storefront_db() {
        assert!(StorageConfig::default().database_path.ends_with("storefront.db"));
    }

    #[test]
    fn dispatcher_defaults_to_five_seconds() {
        let d = DispatcherConfig::default();
        assert!(d.enabled);
        assert_eq!(d.interval_secs, 5);
    }
}
