use axum::extract::{Path, State};
use axum::Json;
use barbershop_core::preferences::{EffectivePreferences, PreferenceFlags};
use barbershop_core::types::UserId;

use crate::error::AppResult;
use crate::extract::JsonBody;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/users/{user_id}/notification-preferences
///
/// Effective flags. A user who never saved preferences gets all `true`.
pub async fn get_preferences(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<DataResponse<EffectivePreferences>>> {
    let row = state.stores.preferences.get(user_id).await?;
    Ok(Json(DataResponse {
        data: EffectivePreferences::resolve(row.as_ref()),
    }))
}

/// PUT /api/v1/users/{user_id}/notification-preferences
///
/// Partial update: omitted flags keep their stored value.
pub async fn update_preferences(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    JsonBody(input): JsonBody<PreferenceFlags>,
) -> AppResult<Json<DataResponse<EffectivePreferences>>> {
    let row = state.stores.preferences.upsert(user_id, &input).await?;
    Ok(Json(DataResponse {
        data: EffectivePreferences::resolve(Some(&row)),
    }))
}
