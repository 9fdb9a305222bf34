//! Notification preference entity model.

use barbershop_core::preferences::PreferenceFlags;
use barbershop_core::types::{Timestamp, UserId};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notification_preferences` table.
///
/// Flags are nullable; use [`NotificationPreferences::flags`] together with
/// [`barbershop_core::preferences::resolve_flag`] to read them.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationPreferences {
    pub user_id: UserId,
    pub booking_confirmations: Option<bool>,
    pub booking_reminders: Option<bool>,
    pub chat_messages: Option<bool>,
    pub giveaways: Option<bool>,
    pub promotions: Option<bool>,
    pub updated_at: Timestamp,
}

impl NotificationPreferences {
    pub fn flags(&self) -> PreferenceFlags {
        PreferenceFlags {
            booking_confirmations: self.booking_confirmations,
            booking_reminders: self.booking_reminders,
            chat_messages: self.chat_messages,
            giveaways: self.giveaways,
            promotions: self.promotions,
        }
    }
}
