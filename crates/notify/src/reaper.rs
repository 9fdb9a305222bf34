//! Removal of subscriptions whose push endpoint no longer exists.

use std::sync::Arc;

use barbershop_core::types::DbId;

use crate::store::{StoreError, SubscriptionStore};

#[derive(Clone)]
pub struct ExpiryReaper {
    subscriptions: Arc<dyn SubscriptionStore>,
}

impl ExpiryReaper {
    pub fn new(subscriptions: Arc<dyn SubscriptionStore>) -> Self {
        Self { subscriptions }
    }

    /// Delete a subscription the push service reported as gone.
    ///
    /// Returns `Ok(false)` when the row had already been removed, which is
    /// not an error.
    pub async fn reap(&self, subscription_id: DbId) -> Result<bool, StoreError> {
        let removed = self.subscriptions.delete(subscription_id).await?;
        if removed {
            tracing::info!(subscription_id, "Removed expired push subscription");
        } else {
            tracing::debug!(subscription_id, "Expired push subscription already removed");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use super::*;
    use crate::testing::MemoryStore;

    #[tokio::test]
    async fn reap_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        let sub = store.add_subscription(user, "https://push.test/gone");
        let reaper = ExpiryReaper::new(store.clone());

        assert!(reaper.reap(sub.id).await.unwrap());
        assert!(!reaper.reap(sub.id).await.unwrap());
        assert!(store.subscriptions_for(user).is_empty());
    }

    #[tokio::test]
    async fn reap_leaves_siblings_alone() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        let gone = store.add_subscription(user, "https://push.test/gone");
        let kept = store.add_subscription(user, "https://push.test/kept");

        ExpiryReaper::new(store.clone()).reap(gone.id).await.unwrap();

        let remaining = store.subscriptions_for(user);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, kept.id);
    }
}
