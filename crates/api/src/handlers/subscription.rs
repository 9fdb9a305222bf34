//! Handlers for registering and removing push subscriptions.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use barbershop_core::subscription::{validate_client_keys, validate_endpoint};
use barbershop_core::types::UserId;
use barbershop_db::models::push_subscription::CreatePushSubscription;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::JsonBody;
use crate::response::DataResponse;
use crate::state::AppState;

/// Keys reported by `PushSubscription.toJSON()` in the browser.
#[derive(Debug, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSubscription {
    pub user_id: UserId,
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveSubscription {
    pub user_id: UserId,
    pub endpoint: String,
}

/// POST /api/v1/push/subscriptions
///
/// Register a device. Re-registering an endpoint updates its owner and keys.
pub async fn register(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<RegisterSubscription>,
) -> AppResult<impl IntoResponse> {
    validate_endpoint(&input.endpoint)?;
    validate_client_keys(&input.keys.p256dh, &input.keys.auth)?;

    let subscription = state
        .stores
        .subscriptions
        .upsert(&CreatePushSubscription {
            user_id: input.user_id,
            endpoint: input.endpoint,
            p256dh: input.keys.p256dh,
            auth: input.keys.auth,
        })
        .await?;

    tracing::info!(
        user_id = %subscription.user_id,
        subscription_id = subscription.id,
        "Push subscription registered"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: subscription }),
    ))
}

/// DELETE /api/v1/push/subscriptions
///
/// Unsubscribe a device. Always 204, even when nothing matched.
pub async fn remove(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<RemoveSubscription>,
) -> AppResult<StatusCode> {
    let removed = state
        .stores
        .subscriptions
        .delete_by_endpoint(input.user_id, &input.endpoint)
        .await?;

    tracing::info!(user_id = %input.user_id, removed, "Push subscription removed");
    Ok(StatusCode::NO_CONTENT)
}
