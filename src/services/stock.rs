//! Stock service — session registry, running totals, and fan-out.
//!
//! DESIGN
//! ======
//! `StockManager` is an explicitly constructed handle held in `AppState`.
//! One `RwLock` guards both the session registry and the store, so a delta
//! and the fan-out of its result are a single critical section. Fan-out
//! never touches a socket: each session owns a bounded outbound queue that
//! its websocket task drains, and the manager only `try_send`s onto it.
//!
//! ERROR HANDLING
//! ==============
//! A queue that reports `Closed` belongs to a session whose task is gone.
//! A queue that is `Full` belongs to a session that can no longer be kept
//! in sync. Both are dropped from the registry in the same pass and
//! delivery continues to the others. Dropping the sender ends the session's
//! task, which closes the socket so the client can reconnect for a fresh
//! snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::message::{StockDelta, StockLevel};

pub type SessionId = Uuid;

// =============================================================================
// STATE
// =============================================================================

/// Registry and store. Only reachable through the manager's lock.
#[derive(Default)]
pub struct StockState {
    /// Connected sessions: `session_id` -> outbound queue.
    pub sessions: HashMap<SessionId, mpsc::Sender<StockLevel>>,
    /// Running totals keyed by flower ID. Absent means zero.
    pub store: HashMap<u64, i64>,
}

impl StockState {
    fn quantity(&self, flower_id: u64) -> i64 {
        self.store.get(&flower_id).copied().unwrap_or(0)
    }

    fn levels(&self) -> Vec<StockLevel> {
        let mut levels: Vec<StockLevel> = self
            .store
            .iter()
            .map(|(&flower_id, &number)| StockLevel { flower_id, number })
            .collect();
        levels.sort_unstable_by_key(|level| level.flower_id);
        levels
    }

    /// Queue `level` for every session except `exclude`. Returns the number
    /// of sessions it was queued for.
    fn fan_out(&mut self, level: StockLevel, exclude: Option<SessionId>) -> usize {
        let mut delivered = 0;
        let mut dropped = Vec::new();

        for (session_id, tx) in &self.sessions {
            if exclude == Some(*session_id) {
                continue;
            }
            match tx.try_send(level) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(%session_id, flower_id = level.flower_id, "stock: session queue full, dropping session");
                    dropped.push(*session_id);
                }
                Err(TrySendError::Closed(_)) => dropped.push(*session_id),
            }
        }

        for session_id in dropped {
            self.sessions.remove(&session_id);
            info!(%session_id, remaining = self.sessions.len(), "stock: removed unreachable session");
        }

        delivered
    }
}

// =============================================================================
// MANAGER
// =============================================================================

#[derive(Clone, Default)]
pub struct StockManager {
    inner: Arc<RwLock<StockState>>,
}

impl StockManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session and return the levels it must be sent first.
    ///
    /// Registration and snapshot share one lock acquisition, so any delta
    /// applied afterwards reaches the session through its queue.
    pub async fn connect(&self, session_id: SessionId, tx: mpsc::Sender<StockLevel>) -> Vec<StockLevel> {
        let mut state = self.inner.write().await;
        state.sessions.insert(session_id, tx);
        let snapshot = state.levels();
        info!(%session_id, sessions = state.sessions.len(), items = snapshot.len(), "stock: session connected");
        snapshot
    }

    /// Remove a session from the registry. Returns whether it was registered.
    pub async fn disconnect(&self, session_id: SessionId) -> bool {
        let mut state = self.inner.write().await;
        let removed = state.sessions.remove(&session_id).is_some();
        if removed {
            info!(%session_id, remaining = state.sessions.len(), "stock: session disconnected");
        }
        removed
    }

    /// Add a delta to the store and fan the new level out to every session
    /// except `sender`. Returns the new level.
    pub async fn apply(&self, sender: SessionId, delta: StockDelta) -> StockLevel {
        let mut state = self.inner.write().await;

        let total = state.store.entry(delta.flower_id).or_insert(0);
        *total = total.saturating_add(delta.number);
        let level = StockLevel { flower_id: delta.flower_id, number: *total };

        let delivered = state.fan_out(level, Some(sender));
        debug!(
            %sender,
            flower_id = level.flower_id,
            delta = delta.number,
            number = level.number,
            delivered,
            "stock: delta applied"
        );
        level
    }

    /// Standalone fan-out outside of `apply`. Returns the number of sessions
    /// the level was queued for.
    #[cfg(test)]
    pub async fn broadcast(&self, level: StockLevel, exclude: Option<SessionId>) -> usize {
        let mut state = self.inner.write().await;
        state.fan_out(level, exclude)
    }

    /// Current total for one item, zero when never adjusted.
    pub async fn quantity(&self, flower_id: u64) -> i64 {
        self.inner.read().await.quantity(flower_id)
    }

    pub async fn level(&self, flower_id: u64) -> StockLevel {
        StockLevel { flower_id, number: self.quantity(flower_id).await }
    }

    /// Every stored level, sorted by flower ID.
    pub async fn snapshot(&self) -> Vec<StockLevel> {
        self.inner.read().await.levels()
    }

    pub async fn session_count(&self) -> usize {
        self.inner.read().await.sessions.len()
    }

    #[cfg(test)]
    pub async fn session_ids(&self) -> Vec<SessionId> {
        self.inner.read().await.sessions.keys().copied().collect()
    }

    #[cfg(test)]
    pub async fn is_connected(&self, session_id: SessionId) -> bool {
        self.inner.read().await.sessions.contains_key(&session_id)
    }
}

#[cfg(test)]
#[path = "stock_test.rs"]
mod tests;
