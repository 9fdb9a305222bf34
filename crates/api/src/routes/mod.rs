pub mod health;
pub mod preferences;
pub mod push;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /push/send                                  deliver to one user (POST)
/// /push/broadcast                             deliver to every user (POST)
/// /push/vapid-public-key                      server public key (GET)
/// /push/subscriptions                         register (POST), unsubscribe (DELETE)
/// /push/logs                                  delivery ledger (GET)
///
/// /users/{user_id}/notification-preferences   get, update (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/push", push::router())
        .nest("/users", preferences::router())
}
