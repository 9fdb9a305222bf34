use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database does not answer.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// `false` means every delivery will answer "VAPID keys not configured".
    pub push_configured: bool,
}

impl HealthResponse {
    fn new(db_healthy: bool, push_configured: bool) -> Self {
        Self {
            status: if db_healthy { "ok" } else { "degraded" },
            version: env!("CARGO_PKG_VERSION"),
            db_healthy,
            push_configured,
        }
    }
}

/// GET /health
///
/// Missing VAPID keys do not degrade the status: subscriptions and
/// preferences keep working without them.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = match &state.pool {
        Some(pool) => barbershop_db::health_check(pool).await.is_ok(),
        None => true,
    };
    let push_configured = state.notifier.vapid_public_key().is_ok();

    Json(HealthResponse::new(db_healthy, push_configured))
}

/// Mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
