// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any recorder can collect these metrics.
//! Without an installed recorder every call is a no-op.

use metrics::{describe_counter, describe_gauge, describe_histogram};

/// Register all Storefront metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!("storefront_events_total", "Inbound events handled");
    describe_counter!("storefront_orders_total", "Orders placed");
    describe_counter!(
        "storefront_order_status_changes_total",
        "Order status changes made by administrators"
    );
    describe_counter!(
        "storefront_notifications_total",
        "Scheduled notifications processed"
    );
    describe_gauge!("storefront_active_sessions", "Users with a live session");
    describe_histogram!("storefront_order_value", "Order totals");
    describe_histogram!(
        "storefront_handle_latency_seconds",
        "Time spent handling one inbound event"
    );
}

/// Record a handled inbound event (`action` or `text`).
pub fn record_event(kind: &'static str) {
    metrics::counter!("storefront_events_total", "kind" => kind).increment(1);
}

pub fn record_order_placed(total: f64) {
    metrics::counter!("storefront_orders_total").increment(1);
    metrics::histogram!("storefront_order_value").record(total);
}

pub fn record_status_change(status: &str) {
    metrics::counter!("storefront_order_status_changes_total", "status" => status.to_string())
        .increment(1);
}

/// Record a notification delivery attempt (`delivered` or `failed`).
pub fn record_notification(outcome: &'static str) {
    metrics::counter!("storefront_notifications_total", "outcome" => outcome).increment(1);
}

pub fn set_active_sessions(count: f64) {
    metrics::gauge!("storefront_active_sessions").set(count);
}

pub fn record_handle_latency(seconds: f64) {
    metrics::histogram!("storefront_handle_latency_seconds").record(seconds);
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[test]
    fn counters_render_with_labels() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || {
            register_metrics();
            record_event("text");
            record_event("text");
            record_notification("failed");
            record_order_placed(25.0);
        });

        let rendered = handle.render();
        assert!(rendered.contains("storefront_events_total{kind=\"text\"} 2"));
        assert!(rendered.contains("storefront_notifications_total{outcome=\"failed\"} 1"));
        assert!(rendered.contains("storefront_orders_total 1"));
    }

    #[test]
    fn gauge_keeps_last_value() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || {
            set_active_sessions(3.0);
            set_active_sessions(5.0);
        });
        assert!(handle.render().contains("storefront_active_sessions 5"));
    }

    #[test]
    fn recording_without_recorder_is_a_no_op() {
        record_event("action");
        record_status_change("Packing");
        record_handle_latency(0.01);
    }
}
