//! Push subscription entity models and DTOs.

use barbershop_core::types::{DbId, Timestamp, UserId};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `push_subscriptions` table: one per (user, browser).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PushSubscription {
    pub id: DbId,
    pub user_id: UserId,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering (or re-registering) a subscription.
#[derive(Debug, Clone)]
pub struct CreatePushSubscription {
    pub user_id: UserId,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
}
