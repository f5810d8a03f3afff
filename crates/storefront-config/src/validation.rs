// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::StorefrontConfig;

/// Validate a deserialized configuration.
///
/// Collects every violation instead of failing on the first.
pub fn validate_config(config: &StorefrontConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |path: &str, reason: String| errors.push(ConfigError::invalid(path, reason));

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path", "must not be empty".to_string());
    }

    let shop = &config.shop;
    if shop.currency.trim().is_empty() {
        fail("shop.currency", "must not be empty".to_string());
    }
    if shop.page_size < 1 {
        fail("shop.page_size", format!("must be at least 1, got {}", shop.page_size));
    }
    if !shop.default_min_delivery_sum.is_finite() || shop.default_min_delivery_sum < 0.0 {
        fail(
            "shop.default_min_delivery_sum",
            format!("must be non-negative, got {}", shop.default_min_delivery_sum),
        );
    }
    if shop
        .demo_admin_phrase
        .as_deref()
        .is_some_and(|phrase| phrase.trim().is_empty())
    {
        fail("shop.demo_admin_phrase", "must not be blank".to_string());
    }
    for (path, value) in [
        ("shop.order_history_limit", shop.order_history_limit),
        ("shop.news_limit", shop.news_limit),
        ("shop.pickup_choice_limit", shop.pickup_choice_limit),
        ("shop.admin_order_limit", shop.admin_order_limit),
    ] {
        if value < 1 {
            fail(path, format!("must be at least 1, got {value}"));
        }
    }

    if config.dispatcher.interval_secs < 1 {
        fail(
            "dispatcher.interval_secs",
            format!("must be at least 1, got {}", config.dispatcher.interval_secs),
        );
    }

    let addr = config.prometheus.listen_address.trim();
    if addr.parse::<std::net::SocketAddr>().is_err() {
        fail(
            "prometheus.listen_address",
            format!("`{addr}` is not a valid socket address"),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &StorefrontConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&StorefrontConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = StorefrontConfig::default();
        config.storage.database_path = " ".to_string();
        assert!(messages(&config).iter().any(|m| m.contains("database_path")));
    }

    #[test]
    fn zero_page_size_fails_validation() {
        let mut config = StorefrontConfig::default();
        config.shop.page_size = 0;
        assert!(messages(&config).iter().any(|m| m.contains("page_size")));
    }

    #[test]
    fn errors_name_the_setting() {
        let mut config = StorefrontConfig::default();
        config.shop.news_limit = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path(), Some("shop.news_limit"));
    }

    #[test]
    fn collects_all_errors() {
        let mut config = StorefrontConfig::default();
        config.shop.currency = String::new();
        config.shop.default_min_delivery_sum = -1.0;
        config.dispatcher.interval_secs = 0;
        config.prometheus.listen_address = "nowhere".to_string();
        assert_eq!(messages(&config).len(), 4);
    }
}
