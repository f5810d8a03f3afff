// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./storefront.toml` > `~/.config/storefront/storefront.toml` >
//! `/etc/storefront/storefront.toml`, with `STOREFRONT_` environment overrides.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::StorefrontConfig;

pub(crate) const SYSTEM_CONFIG: &str = "/etc/storefront/storefront.toml";
pub(crate) const LOCAL_CONFIG: &str = "storefront.toml";

/// Top-level sections, used to turn `STOREFRONT_SHOP_PAGE_SIZE` into `shop.page_size`.
const SECTIONS: &[&str] = &[
    "agent",
    "telegram",
    "storage",
    "shop",
    "dispatcher",
    "prometheus",
];

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("storefront").join(LOCAL_CONFIG))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/storefront/storefront.toml`
/// 3. `~/.config/storefront/storefront.toml`
/// 4. `./storefront.toml`
/// 5. `STOREFRONT_*` environment variables
pub fn load_config() -> Result<StorefrontConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<StorefrontConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StorefrontConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<StorefrontConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StorefrontConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(StorefrontConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Environment provider mapping the section prefix to a dotted path.
///
/// Uses `Env::map()` and not `Env::split("_")`: `STOREFRONT_TELEGRAM_BOT_TOKEN`
/// must become `telegram.bot_token`, not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("STOREFRONT_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_only_the_section_prefix() {
        assert_eq!(map_env_key("telegram_bot_token"), "telegram.bot_token");
        assert_eq!(map_env_key("shop_demo_admin_phrase"), "shop.demo_admin_phrase");
        assert_eq!(map_env_key("dispatcher_interval_secs"), "dispatcher.interval_secs");
        assert_eq!(map_env_key("unrelated"), "unrelated");
    }
}
