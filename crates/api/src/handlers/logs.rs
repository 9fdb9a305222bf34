use axum::extract::{Query, State};
use axum::Json;
use barbershop_core::types::UserId;
use barbershop_db::models::push_log::PushLog;
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum page size for ledger listing.
const MAX_LIMIT: i64 = 200;

/// Default page size for ledger listing.
const DEFAULT_LIMIT: i64 = 50;

/// Query parameters for `GET /push/logs`.
#[derive(Debug, Deserialize)]
pub struct LogQuery {
    pub user_id: Option<UserId>,
    /// Defaults to 50, capped at 200.
    pub limit: Option<i64>,
}

/// GET /api/v1/push/logs
///
/// Most recent delivery ledger rows, newest first.
pub async fn list_logs(
    State(state): State<AppState>,
    Query(params): Query<LogQuery>,
) -> AppResult<Json<DataResponse<Vec<PushLog>>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let logs = state.stores.ledger.list_recent(params.user_id, limit).await?;
    Ok(Json(DataResponse { data: logs }))
}
