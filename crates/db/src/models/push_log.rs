//! Delivery ledger entity models and DTOs.

use barbershop_core::delivery::DeliveryStatus;
use barbershop_core::types::{DbId, Timestamp, UserId};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `push_notification_logs` table. Never updated or deleted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PushLog {
    pub id: DbId,
    /// `None` for broadcast aggregate rows.
    pub user_id: Option<UserId>,
    pub user_name: Option<String>,
    pub notification_type: String,
    pub title: String,
    pub body: String,
    pub status: String,
    pub sent_count: i32,
    pub total_subscriptions: i32,
    pub error_details: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for appending a ledger row.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatePushLog {
    pub user_id: Option<UserId>,
    pub user_name: Option<String>,
    pub notification_type: String,
    pub title: String,
    pub body: String,
    pub status: DeliveryStatus,
    pub sent_count: i32,
    pub total_subscriptions: i32,
    pub error_details: Option<String>,
}
