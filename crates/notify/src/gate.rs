//! Preference gate: decides whether a notification type may reach a user.

use std::sync::Arc;

use barbershop_core::preferences::{preference_key_for, resolve_flag, PreferenceKey};
use barbershop_core::types::UserId;

use crate::store::PreferenceStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    /// The user turned off the flag that controls this type.
    Suppress { flag: PreferenceKey },
}

#[derive(Clone)]
pub struct PreferenceGate {
    preferences: Arc<dyn PreferenceStore>,
}

impl PreferenceGate {
    pub fn new(preferences: Arc<dyn PreferenceStore>) -> Self {
        Self { preferences }
    }

    /// Types outside the mapping are mandatory and skip the lookup entirely.
    /// A failed lookup allows delivery.
    pub async fn check(&self, user_id: UserId, notification_type: &str) -> GateDecision {
        let Some(flag) = preference_key_for(notification_type) else {
            return GateDecision::Allow;
        };

        let row = match self.preferences.get(user_id).await {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    notification_type,
                    error = %e,
                    "Preference lookup failed, allowing delivery"
                );
                return GateDecision::Allow;
            }
        };

        if resolve_flag(row.as_ref(), flag) {
            GateDecision::Allow
        } else {
            GateDecision::Suppress { flag }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use barbershop_core::preferences::notification_types::*;
    use barbershop_core::preferences::PreferenceFlags;
    use uuid::Uuid;

    use super::*;
    use crate::testing::MemoryStore;

    fn gate(store: &Arc<MemoryStore>) -> PreferenceGate {
        PreferenceGate::new(store.clone())
    }

    #[tokio::test]
    async fn user_without_row_receives_everything() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();

        for t in [BOOKING_CONFIRMATION, CHAT_MESSAGE, GIVEAWAY_NEW, PROMOTION, GENERAL] {
            assert_eq!(gate(&store).check(user, t).await, GateDecision::Allow);
        }
    }

    #[tokio::test]
    async fn disabled_flag_suppresses_mapped_type() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        store.set_preferences(
            user,
            PreferenceFlags {
                promotions: Some(false),
                ..Default::default()
            },
        );

        assert_eq!(
            gate(&store).check(user, ADMIN_BROADCAST).await,
            GateDecision::Suppress {
                flag: PreferenceKey::Promotions
            }
        );
        assert_eq!(gate(&store).check(user, CHAT_MESSAGE).await, GateDecision::Allow);
    }

    #[tokio::test]
    async fn unmapped_type_is_never_suppressed() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        store.set_preferences(
            user,
            PreferenceFlags {
                booking_confirmations: Some(false),
                booking_reminders: Some(false),
                chat_messages: Some(false),
                giveaways: Some(false),
                promotions: Some(false),
            },
        );

        assert_eq!(gate(&store).check(user, GENERAL).await, GateDecision::Allow);
    }

    #[tokio::test]
    async fn lookup_failure_allows() {
        let store = Arc::new(MemoryStore::new());
        store.fail_preference_reads(true);

        assert_eq!(
            gate(&store).check(Uuid::new_v4(), CHAT_MESSAGE).await,
            GateDecision::Allow
        );
    }
}
