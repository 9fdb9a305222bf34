//! Handlers for delivery: single-user send, broadcast and the VAPID public key.
//!
//! Request bodies are parsed leniently and validated here, so a missing
//! `userId` or `notification` is a 400 with the standard error body before
//! the delivery engine is touched.

use std::future::Future;

use axum::extract::State;
use axum::Json;
use barbershop_core::payload::NotificationPayload;
use barbershop_core::preferences::notification_types;
use barbershop_notify::{
    BroadcastReport, BroadcastRequest, DeliveryReport, DeliveryRequest, NotifyError,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /push/send`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendPushBody {
    pub user_id: Option<String>,
    pub notification: Option<serde_json::Value>,
    pub notification_type: Option<String>,
    pub user_name: Option<String>,
}

/// Body of `POST /push/broadcast`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastBody {
    pub notification: Option<serde_json::Value>,
    pub notification_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VapidPublicKey {
    pub public_key: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/push/send
///
/// Deliver a notification to every device of one user.
pub async fn send_notification(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SendPushBody>,
) -> AppResult<Json<DeliveryReport>> {
    let user_id = body
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("userId is required".into()))?;
    let user_id = user_id
        .parse()
        .map_err(|_| AppError::BadRequest("userId must be a UUID".into()))?;
    let payload = parse_notification(body.notification)?;

    let request = DeliveryRequest {
        user_id,
        user_name: body.user_name,
        notification_type: body
            .notification_type
            .unwrap_or_else(|| notification_types::GENERAL.to_string()),
        payload,
    };

    let notifier = state.notifier.clone();
    let report = run_detached(async move { notifier.send_to_user(&request).await }).await?;
    Ok(Json(report))
}

/// POST /api/v1/push/broadcast
///
/// Deliver a notification to every user.
pub async fn broadcast(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<BroadcastBody>,
) -> AppResult<Json<BroadcastReport>> {
    let request = BroadcastRequest {
        notification_type: body
            .notification_type
            .unwrap_or_else(|| notification_types::ADMIN_BROADCAST.to_string()),
        payload: parse_notification(body.notification)?,
    };

    let notifier = state.notifier.clone();
    let report = run_detached(async move { notifier.broadcast(&request).await }).await?;
    Ok(Json(report))
}

/// GET /api/v1/push/vapid-public-key
///
/// The key browsers pass as `applicationServerKey` when subscribing.
pub async fn vapid_public_key(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<VapidPublicKey>>> {
    let public_key = state.notifier.vapid_public_key()?.to_string();
    Ok(Json(DataResponse {
        data: VapidPublicKey { public_key },
    }))
}

/// Run a delivery on its own task. Once started it always finishes and
/// writes its ledger row, even if the request times out or the client
/// disconnects.
async fn run_detached<T, F>(delivery: F) -> AppResult<T>
where
    F: Future<Output = Result<T, NotifyError>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(delivery)
        .await
        .map_err(|e| AppError::InternalError(format!("Delivery task failed: {e}")))?
        .map_err(AppError::from)
}

fn parse_notification(value: Option<serde_json::Value>) -> AppResult<NotificationPayload> {
    let value = value
        .filter(|v| !v.is_null())
        .ok_or_else(|| AppError::BadRequest("notification is required".into()))?;
    let payload: NotificationPayload = serde_json::from_value(value)
        .map_err(|e| AppError::BadRequest(format!("Invalid notification: {e}")))?;
    if payload.title.trim().is_empty() {
        return Err(AppError::BadRequest("notification.title must not be empty".into()));
    }
    Ok(payload)
}
