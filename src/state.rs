//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the stock manager (session registry + running totals) and the
//! resolved server config. Each server owns its own instance, so tests can
//! build as many isolated stores as they need.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::services::stock::StockManager;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum, all inner fields are Arc-backed.
#[derive(Clone)]
pub struct AppState {
    pub stock: StockManager,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self { stock: StockManager::new(), config: Arc::new(config) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;

    /// Create a test `AppState` with default config and an empty store.
    #[must_use]
    pub fn test_app_state() -> AppState {
        AppState::new(ServerConfig::default())
    }

    /// Create a test `AppState` whose store already holds the given totals.
    pub async fn seed_app_state(levels: &[(u64, i64)]) -> AppState {
        let state = test_app_state();
        let seeder = uuid::Uuid::new_v4();
        for &(flower_id, number) in levels {
            state
                .stock
                .apply(seeder, crate::message::StockDelta { flower_id, number })
                .await;
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn new_state_has_empty_store() {
        let state = test_helpers::test_app_state();
        assert!(state.stock.snapshot().await.is_empty());
        assert_eq!(state.stock.session_count().await, 0);
        assert_eq!(state.config.client_buffer, crate::config::DEFAULT_CLIENT_BUFFER);
    }

    #[tokio::test]
    async fn clones_share_the_manager() {
        let state = test_helpers::seed_app_state(&[(1, 5)]).await;
        let clone = state.clone();
        assert_eq!(clone.stock.quantity(1).await, 5);
    }

    #[tokio::test]
    async fn separate_states_are_isolated() {
        let a = test_helpers::seed_app_state(&[(1, 5)]).await;
        let b = test_helpers::test_app_state();
        assert_eq!(a.stock.quantity(1).await, 5);
        assert_eq!(b.stock.quantity(1).await, 0);
    }
}
