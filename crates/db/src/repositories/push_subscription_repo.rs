//! Repository for the `push_subscriptions` table.

use barbershop_core::types::{DbId, UserId};
use sqlx::PgPool;

use crate::models::push_subscription::{CreatePushSubscription, PushSubscription};

/// Column list for `push_subscriptions` queries.
const COLUMNS: &str = "id, user_id, endpoint, p256dh, auth, created_at, updated_at";

/// Provides CRUD operations for push subscriptions.
pub struct PushSubscriptionRepo;

impl PushSubscriptionRepo {
    /// List every subscription registered by a user, oldest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: UserId,
    ) -> Result<Vec<PushSubscription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM push_subscriptions \
             WHERE user_id = $1 \
             ORDER BY id"
        );
        sqlx::query_as::<_, PushSubscription>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Register a subscription, or refresh it if the endpoint is already known.
    ///
    /// Browsers keep the endpoint stable across re-subscribes but may rotate
    /// keys or switch the signed-in user, so the conflict target is `endpoint`.
    pub async fn upsert(
        pool: &PgPool,
        input: &CreatePushSubscription,
    ) -> Result<PushSubscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO push_subscriptions (user_id, endpoint, p256dh, auth) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (endpoint) DO UPDATE SET \
                user_id = EXCLUDED.user_id, \
                p256dh = EXCLUDED.p256dh, \
                auth = EXCLUDED.auth, \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PushSubscription>(&query)
            .bind(input.user_id)
            .bind(&input.endpoint)
            .bind(&input.p256dh)
            .bind(&input.auth)
            .fetch_one(pool)
            .await
    }

    /// Delete a subscription by id.
    ///
    /// Returns `true` if a row was removed. Deleting a missing id is not an error.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM push_subscriptions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a user's subscription by endpoint (explicit unsubscribe).
    pub async fn delete_by_endpoint(
        pool: &PgPool,
        user_id: UserId,
        endpoint: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM push_subscriptions WHERE user_id = $1 AND endpoint = $2")
                .bind(user_id)
                .bind(endpoint)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
