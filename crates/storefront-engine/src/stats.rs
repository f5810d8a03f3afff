// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sales statistics periods and report rendering.

use chrono::{Datelike, Days, Months, NaiveDateTime, NaiveTime, TimeDelta};
use strum::{Display, EnumIter, EnumString};

use storefront_core::SalesRow;
use storefront_core::time::format_timestamp;

use crate::render::{escape_html, format_money};

/// Reporting period offered to administrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
pub enum StatsPreset {
    /// Start of the day six days ago until now.
    #[strum(serialize = "7")]
    LastWeek,
    /// Start of the day 29 days ago until now.
    #[strum(serialize = "30")]
    Last30Days,
    /// The whole calendar month containing now.
    #[strum(serialize = "month")]
    ThisMonth,
}

impl StatsPreset {
    pub fn label(self) -> &'static str {
        match self {
            Self::LastWeek => "Last 7 days",
            Self::Last30Days => "Last 30 days",
            Self::ThisMonth => "This month",
        }
    }

    /// Inclusive `[start, end]` bounds in storage format.
    pub fn bounds(self, now: NaiveDateTime) -> (String, String) {
        let today = now.date();
        let (start, end) = match self {
            Self::LastWeek => ((today - Days::new(6)).and_time(NaiveTime::MIN), now),
            Self::Last30Days => ((today - Days::new(29)).and_time(NaiveTime::MIN), now),
            Self::ThisMonth => {
                let first = today - Days::new(u64::from(today.day0()));
                let next = first + Months::new(1);
                (
                    first.and_time(NaiveTime::MIN),
                    next.and_time(NaiveTime::MIN) - TimeDelta::seconds(1),
                )
            }
        };
        (format_timestamp(start), format_timestamp(end))
    }
}

/// Numbered per-product report, best sellers first.
pub fn render_report(rows: &[SalesRow], start: &str, end: &str, currency: &str) -> String {
    if rows.is_empty() {
        return "Statistics: no sales found for the period.".to_string();
    }
    let mut lines = vec![
        "<b>📊 Sales statistics</b>".to_string(),
        format!("Period: <code>{start}</code> — <code>{end}</code>"),
        String::new(),
    ];
    for (i, row) in rows.iter().enumerate() {
        lines.push(format!(
            "{}. {} — {} pcs · {}",
            i + 1,
            escape_html(&row.name),
            row.total_qty,
            format_money(row.total_sum, currency)
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 7)
            .unwrap()
    }

    #[test]
    fn presets_parse_from_payload_names() {
        assert_eq!(StatsPreset::from_str("7").unwrap(), StatsPreset::LastWeek);
        assert_eq!(StatsPreset::from_str("30").unwrap(), StatsPreset::Last30Days);
        assert_eq!(StatsPreset::from_str("month").unwrap(), StatsPreset::ThisMonth);
        assert!(StatsPreset::from_str("year").is_err());
    }

    #[test]
    fn week_starts_at_midnight_six_days_back() {
        let (start, end) = StatsPreset::LastWeek.bounds(at(2026, 3, 10, 15, 30));
        assert_eq!(start, "2026-03-04 00:00:00");
        assert_eq!(end, "2026-03-10 15:30:07");
    }

    #[test]
    fn thirty_days_cross_month_boundary() {
        let (start, _) = StatsPreset::Last30Days.bounds(at(2026, 3, 10, 8, 0));
        assert_eq!(start, "2026-02-09 00:00:00");
    }

    #[test]
    fn month_covers_whole_calendar_month() {
        let (start, end) = StatsPreset::ThisMonth.bounds(at(2026, 2, 14, 12, 0));
        assert_eq!(start, "2026-02-01 00:00:00");
        assert_eq!(end, "2026-02-28 23:59:59");

        let (start, end) = StatsPreset::ThisMonth.bounds(at(2026, 12, 31, 23, 0));
        assert_eq!(start, "2026-12-01 00:00:00");
        assert_eq!(end, "2026-12-31 23:59:59");
    }

    #[test]
    fn report_lists_rows_in_order() {
        let rows = vec![
            SalesRow {
                product_id: 1,
                name: "Tea".into(),
                total_qty: 5,
                total_sum: 50.0,
            },
            SalesRow {
                product_id: 2,
                name: "Cake & Co".into(),
                total_qty: 2,
                total_sum: 1250.0,
            },
        ];
        let text = render_report(&rows, "2026-03-01 00:00:00", "2026-03-31 23:59:59", "RSD");
        assert!(text.contains("1. Tea — 5 pcs · 50.00 RSD"));
        assert!(text.contains("2. Cake &amp; Co — 2 pcs · 1 250.00 RSD"));
    }

    #[test]
    fn empty_report_says_so() {
        assert_eq!(
            render_report(&[], "a", "b", "RSD"),
            "Statistics: no sales found for the period."
        );
    }
}
