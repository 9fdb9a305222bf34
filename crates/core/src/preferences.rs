//! Notification types and the user preference flags that gate them.
//!
//! Every semantic notification type either maps to one of five
//! user-configurable flags or is mandatory (always delivered). A user with no
//! preference row receives everything.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Notification type names
// ---------------------------------------------------------------------------

/// Well-known notification type names sent by callers in `notificationType`.
pub mod notification_types {
    pub const BOOKING_CONFIRMATION: &str = "booking_confirmation";
    pub const BOOKING_CANCELLATION: &str = "booking_cancellation";
    pub const BOOKING_REMINDER: &str = "booking_reminder";
    pub const CHAT_MESSAGE: &str = "chat_message";
    pub const GIVEAWAY_WINNER: &str = "giveaway_winner";
    pub const GIVEAWAY_NEW: &str = "giveaway_new";
    pub const PROMOTION: &str = "promotion";
    pub const ADMIN_BROADCAST: &str = "admin_broadcast";

    /// Used when the caller does not name a type. Not mapped, so never gated.
    pub const GENERAL: &str = "general";
}

// ---------------------------------------------------------------------------
// PreferenceKey
// ---------------------------------------------------------------------------

/// One of the five user-configurable notification flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceKey {
    BookingConfirmations,
    BookingReminders,
    ChatMessages,
    Giveaways,
    Promotions,
}

impl PreferenceKey {
    /// All flags, in column order.
    pub const ALL: [PreferenceKey; 5] = [
        Self::BookingConfirmations,
        Self::BookingReminders,
        Self::ChatMessages,
        Self::Giveaways,
        Self::Promotions,
    ];

    /// Column name in `notification_preferences`.
    pub fn column(self) -> &'static str {
        match self {
            Self::BookingConfirmations => "booking_confirmations",
            Self::BookingReminders => "booking_reminders",
            Self::ChatMessages => "chat_messages",
            Self::Giveaways => "giveaways",
            Self::Promotions => "promotions",
        }
    }
}

/// Map a notification type to the flag that controls it.
///
/// Returns `None` for mandatory/system types, which are never suppressed.
pub fn preference_key_for(notification_type: &str) -> Option<PreferenceKey> {
    use notification_types::*;

    match notification_type {
        BOOKING_CONFIRMATION | BOOKING_CANCELLATION => Some(PreferenceKey::BookingConfirmations),
        BOOKING_REMINDER => Some(PreferenceKey::BookingReminders),
        CHAT_MESSAGE => Some(PreferenceKey::ChatMessages),
        GIVEAWAY_WINNER | GIVEAWAY_NEW => Some(PreferenceKey::Giveaways),
        PROMOTION | ADMIN_BROADCAST => Some(PreferenceKey::Promotions),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// Stored flag values. `None` means the field was never set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceFlags {
    pub booking_confirmations: Option<bool>,
    pub booking_reminders: Option<bool>,
    pub chat_messages: Option<bool>,
    pub giveaways: Option<bool>,
    pub promotions: Option<bool>,
}

impl PreferenceFlags {
    pub fn get(&self, key: PreferenceKey) -> Option<bool> {
        match key {
            PreferenceKey::BookingConfirmations => self.booking_confirmations,
            PreferenceKey::BookingReminders => self.booking_reminders,
            PreferenceKey::ChatMessages => self.chat_messages,
            PreferenceKey::Giveaways => self.giveaways,
            PreferenceKey::Promotions => self.promotions,
        }
    }
}

/// Resolve a single flag to a definite boolean.
///
/// - No row at all: allowed.
/// - Row present, flag explicitly `false`: suppressed.
/// - Row present, flag `true` or unset: allowed.
pub fn resolve_flag(row: Option<&PreferenceFlags>, key: PreferenceKey) -> bool {
    match row {
        None => true,
        Some(flags) => flags.get(key) != Some(false),
    }
}

/// Fully resolved flags, as shown to the user on the settings screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EffectivePreferences {
    pub booking_confirmations: bool,
    pub booking_reminders: bool,
    pub chat_messages: bool,
    pub giveaways: bool,
    pub promotions: bool,
}

impl EffectivePreferences {
    pub fn resolve(row: Option<&PreferenceFlags>) -> Self {
        Self {
            booking_confirmations: resolve_flag(row, PreferenceKey::BookingConfirmations),
            booking_reminders: resolve_flag(row, PreferenceKey::BookingReminders),
            chat_messages: resolve_flag(row, PreferenceKey::ChatMessages),
            giveaways: resolve_flag(row, PreferenceKey::Giveaways),
            promotions: resolve_flag(row, PreferenceKey::Promotions),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::notification_types::*;
    use super::*;

    #[test]
    fn absent_row_allows_every_flag() {
        for key in PreferenceKey::ALL {
            assert!(resolve_flag(None, key), "{key:?} should default to allowed");
        }
    }

    #[test]
    fn explicit_false_suppresses() {
        let flags = PreferenceFlags {
            chat_messages: Some(false),
            ..Default::default()
        };
        assert!(!resolve_flag(Some(&flags), PreferenceKey::ChatMessages));
    }

    #[test]
    fn unset_field_in_existing_row_allows() {
        let flags = PreferenceFlags {
            chat_messages: Some(false),
            ..Default::default()
        };
        assert!(resolve_flag(Some(&flags), PreferenceKey::Giveaways));
    }

    #[test]
    fn explicit_true_allows() {
        let flags = PreferenceFlags {
            promotions: Some(true),
            ..Default::default()
        };
        assert!(resolve_flag(Some(&flags), PreferenceKey::Promotions));
    }

    #[test]
    fn type_mapping() {
        assert_eq!(
            preference_key_for(BOOKING_CONFIRMATION),
            Some(PreferenceKey::BookingConfirmations)
        );
        assert_eq!(
            preference_key_for(BOOKING_REMINDER),
            Some(PreferenceKey::BookingReminders)
        );
        assert_eq!(preference_key_for(CHAT_MESSAGE), Some(PreferenceKey::ChatMessages));
        assert_eq!(preference_key_for(GIVEAWAY_WINNER), Some(PreferenceKey::Giveaways));
        assert_eq!(preference_key_for(ADMIN_BROADCAST), Some(PreferenceKey::Promotions));
        assert_eq!(preference_key_for(GENERAL), None);
        assert_eq!(preference_key_for("loyalty_stamp"), None);
    }

    #[test]
    fn effective_preferences_resolve_defaults() {
        let flags = PreferenceFlags {
            giveaways: Some(false),
            ..Default::default()
        };
        let effective = EffectivePreferences::resolve(Some(&flags));
        assert!(effective.booking_confirmations);
        assert!(!effective.giveaways);
        assert_eq!(
            EffectivePreferences::resolve(None),
            EffectivePreferences {
                booking_confirmations: true,
                booking_reminders: true,
                chat_messages: true,
                giveaways: true,
                promotions: true,
            }
        );
    }
}
