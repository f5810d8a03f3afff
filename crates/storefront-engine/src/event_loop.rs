// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The inbound event loop.
//!
//! Events are routed to per-user lanes: a bounded queue drained by one task
//! per user. Events of one user are handled in arrival order while different
//! users proceed concurrently. Routing never waits on a lane; events beyond a
//! full lane's capacity are dropped. A lane that stays idle closes itself and is
//! replaced on the user's next event; the replacement waits for its
//! predecessor so ordering holds across the handover.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use storefront_core::{InboundEvent, OutboundMessage};

use crate::SharedChannel;
use crate::engine::ConversationEngine;

const LANE_CAPACITY: usize = 64;
const BUSY_TEXT: &str = "Too many requests, please wait";
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);
const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

struct Lane {
    tx: mpsc::Sender<InboundEvent>,
    handle: JoinHandle<()>,
}

pub struct EngineLoop {
    channel: SharedChannel,
    engine: Arc<ConversationEngine>,
    lanes: HashMap<i64, Lane>,
    idle_timeout: Duration,
    drain_timeout: Duration,
}

impl EngineLoop {
    pub fn new(channel: SharedChannel, engine: Arc<ConversationEngine>) -> Self {
        Self {
            channel,
            engine,
            lanes: HashMap::new(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    /// Receives and routes events until the channel closes or `cancel` fires,
    /// then waits for queued events to finish.
    pub async fn run(&mut self, cancel: CancellationToken) {
        info!("engine loop running");
        let mut prune = tokio::time::interval(self.idle_timeout);

        loop {
            tokio::select! {
                received = self.channel.receive() => match received {
                    Ok(event) => self.dispatch(event),
                    Err(e) if e.is_channel_closed() => {
                        info!("channel closed, stopping engine loop");
                        break;
                    }
                    Err(e) => error!(error = %e, "channel receive error"),
                },
                _ = prune.tick() => self.prune_lanes(),
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping engine loop");
                    break;
                }
            }
        }

        self.drain().await;
        info!("engine loop stopped");
    }

    /// Routes `event` to its user's lane without waiting on it, so a backed
    /// up lane never holds up other users.
    fn dispatch(&mut self, event: InboundEvent) {
        let user_id = event.user_id();
        let (event, previous) = match self.lanes.remove(&user_id) {
            Some(lane) => match lane.tx.try_send(event) {
                Ok(()) => {
                    self.lanes.insert(user_id, lane);
                    return;
                }
                Err(mpsc::error::TrySendError::Full(event)) => {
                    self.lanes.insert(user_id, lane);
                    self.reject_busy(event);
                    return;
                }
                Err(mpsc::error::TrySendError::Closed(event)) => (event, Some(lane.handle)),
            },
            None => (event, None),
        };

        let lane = self.spawn_lane(user_id, previous);
        if let Err(e) = lane.tx.try_send(event) {
            warn!(user_id, error = %e, "fresh lane rejected event");
        }
        self.lanes.insert(user_id, lane);
    }

    /// Drops an event whose lane is full. A button press still gets its
    /// callback answered.
    fn reject_busy(&self, event: InboundEvent) {
        warn!(user_id = event.user_id(), kind = event.kind(), "user lane is full, event dropped");
        if let InboundEvent::ActionPress {
            callback_id: Some(callback_id),
            ..
        } = event
        {
            let channel = Arc::clone(&self.channel);
            tokio::spawn(async move {
                let ack = OutboundMessage::Ack {
                    callback_id,
                    text: Some(BUSY_TEXT.into()),
                };
                deliver(&channel, vec![ack]).await;
            });
        }
    }

    fn spawn_lane(&self, user_id: i64, previous: Option<JoinHandle<()>>) -> Lane {
        let (tx, mut rx) = mpsc::channel::<InboundEvent>(LANE_CAPACITY);
        let engine = Arc::clone(&self.engine);
        let channel = Arc::clone(&self.channel);
        let idle_timeout = self.idle_timeout;

        let handle = tokio::spawn(async move {
            if let Some(previous) = previous {
                let _ = previous.await;
            }
            debug!(user_id, "lane started");
            loop {
                match tokio::time::timeout(idle_timeout, rx.recv()).await {
                    Ok(Some(event)) => process(&engine, &channel, event).await,
                    Ok(None) => break,
                    Err(_) => {
                        // Refuse new events, then finish what was queued.
                        rx.close();
                        while let Some(event) = rx.recv().await {
                            process(&engine, &channel, event).await;
                        }
                        break;
                    }
                }
            }
            debug!(user_id, "lane closed");
        });

        Lane { tx, handle }
    }

    fn prune_lanes(&mut self) {
        self.lanes.retain(|_, lane| !lane.handle.is_finished());
        #[cfg(feature = "prometheus")]
        storefront_prometheus::set_active_sessions(self.lanes.len() as f64);
    }

    async fn drain(&mut self) {
        let handles: Vec<JoinHandle<()>> = self.lanes.drain().map(|(_, lane)| lane.handle).collect();
        if handles.is_empty() {
            return;
        }
        info!(count = handles.len(), "draining user lanes");
        let wait_all = async {
            for handle in handles {
                let _ = handle.await;
            }
        };
        if tokio::time::timeout(self.drain_timeout, wait_all).await.is_err() {
            warn!("drain timeout reached, some events were not handled");
        }
    }
}

async fn process(engine: &ConversationEngine, channel: &SharedChannel, event: InboundEvent) {
    let replies = match engine.handle(event.clone()).await {
        Ok(replies) => replies,
        Err(e) => {
            error!(error = %e, user_id = event.user_id(), "failed to handle event");
            ConversationEngine::failure_reply(&event)
        }
    };
    deliver(channel, replies).await;
}

/// Sends `messages` in order. Failures are logged and do not stop the rest.
pub async fn deliver(channel: &SharedChannel, messages: Vec<OutboundMessage>) {
    for msg in messages {
        if let Err(e) = channel.send(msg).await {
            warn!(error = %e, "failed to deliver message");
        }
    }
}
