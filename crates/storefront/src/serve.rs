// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `storefront serve` command implementation.
//!
//! Opens storage, connects the Telegram channel and runs the engine loop
//! next to the notification dispatcher and the status notifier until a
//! shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use storefront_config::StorefrontConfig;
use storefront_core::{ChannelAdapter, ContentStore, PluginAdapter, StorageAdapter, StorefrontError};
use storefront_engine::shutdown::install_signal_handler;
use storefront_engine::{
    ConversationEngine, EngineLoop, EventBus, NotificationDispatcher, SharedChannel,
    StatusNotifier,
};
use storefront_session::SessionStore;
use storefront_storage::SqliteStorage;
use tracing::{debug, info, warn};

#[cfg(feature = "telegram")]
use storefront_telegram::TelegramChannel;

/// Opens and migrates the database and writes missing default settings.
pub async fn open_storage(config: &StorefrontConfig) -> Result<SqliteStorage, StorefrontError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    storage
        .seed_defaults(config.shop.default_min_delivery_sum)
        .await?;
    Ok(storage)
}

/// Runs the `storefront serve` command.
pub async fn run_serve(config: StorefrontConfig) -> Result<(), StorefrontError> {
    init_tracing(&config.agent.log_level);

    info!(name = %config.agent.name, "starting storefront serve");

    let storage: Arc<dyn StorageAdapter> = Arc::new(open_storage(&config).await?);

    #[cfg(feature = "prometheus")]
    let _prometheus_adapter = start_prometheus(&config);

    #[cfg(feature = "telegram")]
    let channel: SharedChannel = {
        let mut telegram = TelegramChannel::new(config.telegram.clone()).inspect_err(|_| {
            eprintln!(
                "error: Telegram bot token required. Set telegram.bot_token in the config \
                 or STOREFRONT_TELEGRAM_BOT_TOKEN in the environment"
            );
        })?;
        telegram.connect().await?;
        Arc::new(telegram)
    };

    #[cfg(not(feature = "telegram"))]
    compile_error!("storefront requires the 'telegram' feature for its channel");

    let cancel = install_signal_handler();
    let events = EventBus::new();
    let engine = Arc::new(ConversationEngine::new(
        Arc::clone(&storage),
        Arc::new(SessionStore::new()),
        config.shop.clone(),
        events.clone(),
    ));

    let mut workers = Vec::new();
    if config.dispatcher.enabled {
        let dispatcher = NotificationDispatcher::new(
            Arc::clone(&storage),
            Arc::clone(&channel),
            Duration::from_secs(config.dispatcher.interval_secs.max(1)),
        );
        workers.push(tokio::spawn(dispatcher.run(cancel.clone())));
    } else {
        info!("notification dispatcher disabled by configuration");
    }
    let notifier = StatusNotifier::new(Arc::clone(&channel), &events);
    workers.push(tokio::spawn(notifier.run(cancel.clone())));

    let mut engine_loop = EngineLoop::new(Arc::clone(&channel), engine);
    engine_loop.run(cancel.clone()).await;

    // The loop may also stop because the channel closed.
    cancel.cancel();
    for worker in workers {
        if let Err(e) = worker.await {
            warn!(error = %e, "background worker ended abnormally");
        }
    }

    if let Err(e) = channel.shutdown().await {
        warn!(error = %e, "channel shutdown failed");
    }
    storage.close().await?;

    info!("storefront serve shutdown complete");
    Ok(())
}

#[cfg(feature = "prometheus")]
fn start_prometheus(config: &StorefrontConfig) -> Option<storefront_prometheus::PrometheusAdapter> {
    if !config.prometheus.enabled {
        debug!("prometheus metrics disabled by configuration");
        return None;
    }
    let addr = match config.prometheus.listen_address.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!(error = %e, address = %config.prometheus.listen_address, "invalid prometheus listen address, continuing without metrics");
            return None;
        }
    };
    match storefront_prometheus::PrometheusAdapter::with_listener(addr) {
        Ok(adapter) => Some(adapter),
        Err(e) => {
            warn!(error = %e, "prometheus initialization failed, continuing without metrics");
            None
        }
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "storefront={log_level},storefront_engine={log_level},storefront_storage={log_level},storefront_telegram={log_level},warn"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
