use std::sync::Arc;

use barbershop_notify::{PushNotifier, Stores};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything inside is an `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database pool, used by the health check. `None` when the stores are
    /// not database-backed.
    pub pool: Option<barbershop_db::DbPool>,
    pub config: Arc<ServerConfig>,
    /// Subscription, preference, ledger and user collaborators.
    pub stores: Stores,
    /// Delivery engine.
    pub notifier: PushNotifier,
}
