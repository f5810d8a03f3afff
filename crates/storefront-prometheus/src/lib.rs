// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prometheus metrics adapter for the Storefront bot.
//!
//! Uses the metrics-rs facade with the Prometheus exporter. The engine and
//! dispatcher record through [`recording`]; this adapter installs the global
//! recorder and, optionally, an HTTP listener serving `/metrics`.

pub mod recording;

use std::net::SocketAddr;

use async_trait::async_trait;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use storefront_core::{AdapterType, HealthStatus, PluginAdapter, StorefrontError};

pub use recording::{
    record_event, record_handle_latency, record_notification, record_order_placed,
    record_status_change, set_active_sessions,
};

/// Prometheus metrics adapter.
pub struct PrometheusAdapter {
    handle: PrometheusHandle,
    listen_address: Option<SocketAddr>,
}

impl PrometheusAdapter {
    /// Installs the Prometheus recorder globally without an HTTP listener.
    ///
    /// Only one recorder can be installed per process.
    pub fn new() -> Result<Self, StorefrontError> {
        let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
            StorefrontError::Internal(format!("failed to install Prometheus recorder: {e}"))
        })?;

        recording::register_metrics();
        tracing::info!("prometheus metrics recorder installed");

        Ok(Self {
            handle,
            listen_address: None,
        })
    }

    /// Installs the recorder and spawns the scrape endpoint on `addr`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn with_listener(addr: SocketAddr) -> Result<Self, StorefrontError> {
        let (recorder, exporter) = PrometheusBuilder::new()
            .with_http_listener(addr)
            .build()
            .map_err(|e| {
                StorefrontError::Internal(format!("failed to build Prometheus exporter: {e}"))
            })?;
        let handle = recorder.handle();
        metrics::set_global_recorder(recorder).map_err(|_| {
            StorefrontError::Internal("a metrics recorder is already installed".into())
        })?;

        tokio::spawn(async move {
            if let Err(e) = exporter.await {
                tracing::error!(error = ?e, "prometheus exporter stopped");
            }
        });

        recording::register_metrics();
        tracing::info!(listen_address = %addr, "prometheus exporter listening");

        Ok(Self {
            handle,
            listen_address: Some(addr),
        })
    }

    pub fn handle(&self) -> &PrometheusHandle {
        &self.handle
    }

    pub fn listen_address(&self) -> Option<SocketAddr> {
        self.listen_address
    }

    /// Render all collected metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

#[async_trait]
impl PluginAdapter for PrometheusAdapter {
    fn name(&self) -> &str {
        "prometheus"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Observability
    }

    async fn health_check(&self) -> Result<HealthStatus, StorefrontError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), StorefrontError> {
        Ok(())
    }
}
