//! Repository for the `notification_preferences` table.

use barbershop_core::preferences::PreferenceFlags;
use barbershop_core::types::UserId;
use sqlx::PgPool;

use crate::models::notification_preference::NotificationPreferences;

/// Column list for `notification_preferences` queries.
const COLUMNS: &str = "user_id, booking_confirmations, booking_reminders, chat_messages, \
    giveaways, promotions, updated_at";

/// Provides read and upsert operations for notification preferences.
pub struct NotificationPreferenceRepo;

impl NotificationPreferenceRepo {
    /// Get the user's preference row, if one was ever saved.
    pub async fn get(
        pool: &PgPool,
        user_id: UserId,
    ) -> Result<Option<NotificationPreferences>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notification_preferences WHERE user_id = $1");
        sqlx::query_as::<_, NotificationPreferences>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or update the user's preferences.
    ///
    /// Uses `COALESCE` to only overwrite flags that are `Some` in the input;
    /// on first insert unset flags start as `true`.
    pub async fn upsert(
        pool: &PgPool,
        user_id: UserId,
        flags: &PreferenceFlags,
    ) -> Result<NotificationPreferences, sqlx::Error> {
        let query = format!(
            "INSERT INTO notification_preferences \
                (user_id, booking_confirmations, booking_reminders, chat_messages, \
                 giveaways, promotions) \
             VALUES ($1, COALESCE($2, true), COALESCE($3, true), COALESCE($4, true), \
                     COALESCE($5, true), COALESCE($6, true)) \
             ON CONFLICT (user_id) DO UPDATE SET \
                booking_confirmations = COALESCE($2, notification_preferences.booking_confirmations), \
                booking_reminders = COALESCE($3, notification_preferences.booking_reminders), \
                chat_messages = COALESCE($4, notification_preferences.chat_messages), \
                giveaways = COALESCE($5, notification_preferences.giveaways), \
                promotions = COALESCE($6, notification_preferences.promotions), \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationPreferences>(&query)
            .bind(user_id)
            .bind(flags.booking_confirmations)
            .bind(flags.booking_reminders)
            .bind(flags.chat_messages)
            .bind(flags.giveaways)
            .bind(flags.promotions)
            .fetch_one(pool)
            .await
    }
}
