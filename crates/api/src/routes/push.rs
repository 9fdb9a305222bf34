//! Route definitions for the `/push` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{logs, push, subscription};
use crate::state::AppState;

/// Routes mounted at `/push`.
///
/// ```text
/// POST   /send                -> send_notification
/// POST   /broadcast           -> broadcast
/// GET    /vapid-public-key    -> vapid_public_key
/// POST   /subscriptions       -> register
/// DELETE /subscriptions       -> remove
/// GET    /logs                -> list_logs
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/send", post(push::send_notification))
        .route("/broadcast", post(push::broadcast))
        .route("/vapid-public-key", get(push::vapid_public_key))
        .route(
            "/subscriptions",
            post(subscription::register).delete(subscription::remove),
        )
        .route("/logs", get(logs::list_logs))
}
