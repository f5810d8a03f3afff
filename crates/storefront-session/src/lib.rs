// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user session state: the cart, the active dialogue flow and the set of
//! users who unlocked the admin panel.
//!
//! State lives in memory only and is lost on restart. Events for different
//! users proceed concurrently; events for the same user are serialised by the
//! per-user mutex returned from [`SessionStore::session`].

pub mod cart;
pub mod flow;

use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use tokio::sync::Mutex;
use tracing::debug;

pub use cart::Cart;
pub use flow::{Flow, PostStep, ProductStep};

/// Everything remembered about one user between events.
#[derive(Debug, Default)]
pub struct UserSession {
    pub cart: Cart,
    pub flow: Option<Flow>,
}

impl UserSession {
    /// Start a flow, replacing any previous one.
    pub fn start(&mut self, flow: Flow) {
        if let Some(previous) = self.flow.replace(flow) {
            debug!(previous = previous.name(), "flow replaced");
        }
    }

    /// Remove and return the active flow.
    pub fn take_flow(&mut self) -> Option<Flow> {
        self.flow.take()
    }

    pub fn clear_flow(&mut self) {
        self.flow = None;
    }
}

/// Shared handle to one user's session.
pub type SessionHandle = Arc<Mutex<UserSession>>;

/// All live sessions.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<i64, SessionHandle>,
    admin_grants: DashSet<i64>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The session for `user_id`, created empty on first use.
    pub fn session(&self, user_id: i64) -> SessionHandle {
        self.sessions
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(UserSession::default())))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Unlock the admin panel for `user_id` until revoked or restart.
    pub fn grant_admin(&self, user_id: i64) {
        self.admin_grants.insert(user_id);
    }

    pub fn revoke_admin(&self, user_id: i64) {
        self.admin_grants.remove(&user_id);
    }

    pub fn is_granted(&self, user_id: i64) -> bool {
        self.admin_grants.contains(&user_id)
    }
}
