// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timestamp format shared by storage and the engine.
//!
//! Stored timestamps are local time, second precision, `YYYY-MM-DD HH:MM:SS`,
//! so lexical order equals chronological order.

use chrono::{Local, NaiveDateTime};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format accepted from administrators for scheduled times.
pub const INPUT_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn format_timestamp(dt: NaiveDateTime) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Current local time in storage format.
pub fn now_timestamp() -> String {
    format_timestamp(Local::now().naive_local())
}

/// Parses `YYYY-MM-DD HH:MM` input into storage format (seconds zeroed).
pub fn parse_input_time(input: &str) -> Option<String> {
    NaiveDateTime::parse_from_str(input.trim(), INPUT_FORMAT)
        .ok()
        .map(format_timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_time_gets_zero_seconds() {
        assert_eq!(
            parse_input_time(" 2026-03-08 09:30 ").as_deref(),
            Some("2026-03-08 09:30:00")
        );
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert_eq!(parse_input_time("tomorrow"), None);
        assert_eq!(parse_input_time("2026-13-01 10:00"), None);
        assert_eq!(parse_input_time("2026-03-08"), None);
    }

    #[test]
    fn now_has_storage_shape() {
        let now = now_timestamp();
        assert_eq!(now.len(), 19);
        assert!(NaiveDateTime::parse_from_str(&now, TIMESTAMP_FORMAT).is_ok());
    }
}
