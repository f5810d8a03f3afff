// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot maintenance commands: `notify`, `pending` and `stats`.

use std::str::FromStr;

use chrono::{Local, NaiveDateTime};
use storefront_config::StorefrontConfig;
use storefront_core::time::{now_timestamp, parse_input_time};
use storefront_core::{NotificationStore, OrderStore, StorageAdapter, StorefrontError};
use storefront_engine::{StatsPreset, render_report};

use crate::serve::open_storage;

pub fn parse_preset(value: &str) -> Result<StatsPreset, String> {
    StatsPreset::from_str(value).map_err(|_| format!("unknown preset '{value}', expected 7, 30 or month"))
}

/// Schedules a notification and returns a confirmation line.
pub async fn run_notify(
    config: &StorefrontConfig,
    chat_id: i64,
    text: &str,
    at: Option<&str>,
) -> Result<String, StorefrontError> {
    if text.trim().is_empty() {
        return Err(StorefrontError::Validation("notification text is empty".into()));
    }
    let send_at = match at {
        Some(at) => parse_input_time(at).ok_or_else(|| {
            StorefrontError::Validation(format!("invalid time '{at}', expected YYYY-MM-DD HH:MM"))
        })?,
        None => now_timestamp(),
    };

    let storage = open_storage(config).await?;
    let id = storage.schedule_notification(chat_id, text, &send_at).await;
    storage.close().await?;
    let id = id?;

    tracing::info!(notification_id = id, chat_id, send_at = %send_at, "notification scheduled");
    Ok(format!("notification #{id} scheduled for {send_at}"))
}

/// Lists unsent notifications, earliest first.
pub async fn run_pending(config: &StorefrontConfig) -> Result<String, StorefrontError> {
    let storage = open_storage(config).await?;
    let pending = storage.list_pending_notifications().await;
    storage.close().await?;

    let pending = pending?;
    if pending.is_empty() {
        return Ok("no pending notifications".to_string());
    }
    let lines: Vec<String> = pending
        .iter()
        .map(|n| format!("#{} {} chat {}: {}", n.id, n.send_at, n.chat_id, n.text))
        .collect();
    Ok(lines.join("\n"))
}

/// Builds the plain-text sales report for `preset` ending now.
pub async fn run_stats(
    config: &StorefrontConfig,
    preset: StatsPreset,
) -> Result<String, StorefrontError> {
    stats_at(config, preset, Local::now().naive_local()).await
}

async fn stats_at(
    config: &StorefrontConfig,
    preset: StatsPreset,
    now: NaiveDateTime,
) -> Result<String, StorefrontError> {
    let (start, end) = preset.bounds(now);
    let storage = open_storage(config).await?;
    let rows = storage.sales_by_product(&start, &end, None).await;
    storage.close().await?;

    let report = render_report(&rows?, &start, &end, &config.shop.currency);
    Ok(format!("{}\n{}", preset.label(), strip_tags(&report)))
}

/// Drops HTML tags and unescapes the entities the renderer produces.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.replace("&lt;", "<").replace("&gt;", ">").replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn config_in(dir: &tempfile::TempDir) -> StorefrontConfig {
        let mut config = StorefrontConfig::default();
        config.storage.database_path = dir.path().join("shop.db").to_string_lossy().to_string();
        config
    }

    #[tokio::test]
    async fn notify_schedules_for_given_time() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);

        let line = run_notify(&config, 42, "Sale today", Some("2020-01-01 09:00"))
            .await
            .unwrap();
        assert!(line.ends_with("scheduled for 2020-01-01 09:00:00"));

        let storage = open_storage(&config).await.unwrap();
        let due = storage.fetch_due_notifications(&now_timestamp()).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].chat_id, 42);
        assert_eq!(due[0].text, "Sale today");
        storage.close().await.unwrap();
    }

    #[tokio::test]
    async fn pending_lists_future_notifications() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        assert_eq!(run_pending(&config).await.unwrap(), "no pending notifications");

        run_notify(&config, 7, "Opening hours changed", Some("2099-05-01 10:00"))
            .await
            .unwrap();
        let listing = run_pending(&config).await.unwrap();
        assert!(listing.contains("2099-05-01 10:00:00 chat 7: Opening hours changed"));
    }

    #[tokio::test]
    async fn notify_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);

        let err = run_notify(&config, 1, "hi", Some("tomorrow")).await.unwrap_err();
        assert!(matches!(err, StorefrontError::Validation(_)));
        let err = run_notify(&config, 1, "   ", None).await.unwrap_err();
        assert!(matches!(err, StorefrontError::Validation(_)));
    }

    #[tokio::test]
    async fn stats_without_sales_says_so() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        let now = NaiveDate::from_ymd_opt(2026, 3, 8)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();

        let report = stats_at(&config, StatsPreset::LastWeek, now).await.unwrap();
        assert_eq!(report, "Last 7 days\nStatistics: no sales found for the period.");
    }

    #[test]
    fn preset_parsing() {
        assert_eq!(parse_preset("30"), Ok(StatsPreset::Last30Days));
        assert!(parse_preset("90").is_err());
    }

    #[test]
    fn tags_are_stripped() {
        assert_eq!(
            strip_tags("<b>📊 Sales</b>\n1. Tea &amp; Co — 2 pcs"),
            "📊 Sales\n1. Tea & Co — 2 pcs"
        );
    }
}
