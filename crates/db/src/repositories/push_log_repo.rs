//! Repository for the append-only `push_notification_logs` table.

use barbershop_core::types::{DbId, UserId};
use sqlx::PgPool;

use crate::models::push_log::{CreatePushLog, PushLog};

/// Column list for `push_notification_logs` queries.
const COLUMNS: &str = "id, user_id, user_name, notification_type, title, body, status, \
    sent_count, total_subscriptions, error_details, created_at";

/// Insert and read operations for the delivery ledger. There is no update
/// or delete.
pub struct PushLogRepo;

impl PushLogRepo {
    /// Append a ledger row, returning the generated ID.
    pub async fn insert(pool: &PgPool, entry: &CreatePushLog) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO push_notification_logs \
                (user_id, user_name, notification_type, title, body, status, \
                 sent_count, total_subscriptions, error_details) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING id",
        )
        .bind(entry.user_id)
        .bind(&entry.user_name)
        .bind(&entry.notification_type)
        .bind(&entry.title)
        .bind(&entry.body)
        .bind(entry.status.as_str())
        .bind(entry.sent_count)
        .bind(entry.total_subscriptions)
        .bind(&entry.error_details)
        .fetch_one(pool)
        .await
    }

    /// List the most recent ledger rows, optionally for a single user.
    pub async fn list_recent(
        pool: &PgPool,
        user_id: Option<UserId>,
        limit: i64,
    ) -> Result<Vec<PushLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM push_notification_logs \
             WHERE ($1::uuid IS NULL OR user_id = $1) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, PushLog>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
