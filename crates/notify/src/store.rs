//! Storage seams for the delivery engine.
//!
//! The engine only needs a handful of operations from its collaborators, so
//! each collaborator is a small trait. [`PgStore`] implements all of them on
//! top of the `barbershop-db` repositories; tests use the in-memory store in
//! [`crate::testing`].

use std::sync::Arc;

use async_trait::async_trait;
use barbershop_core::preferences::PreferenceFlags;
use barbershop_core::types::{DbId, UserId};
use barbershop_db::models::profile::Profile;
use barbershop_db::models::push_log::{CreatePushLog, PushLog};
use barbershop_db::models::push_subscription::{CreatePushSubscription, PushSubscription};
use barbershop_db::repositories::{
    NotificationPreferenceRepo, ProfileRepo, PushLogRepo, PushSubscriptionRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Failure reported by a non-SQL backend.
    #[error("Store backend error: {0}")]
    Backend(String),
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Push endpoint registrations, keyed by user.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<PushSubscription>, StoreError>;

    /// Insert or re-point a registration. The endpoint is the identity.
    async fn upsert(&self, input: &CreatePushSubscription) -> Result<PushSubscription, StoreError>;

    /// Delete by id. Returns `false` when the row was already gone.
    async fn delete(&self, id: DbId) -> Result<bool, StoreError>;

    async fn delete_by_endpoint(&self, user_id: UserId, endpoint: &str)
        -> Result<bool, StoreError>;
}

/// Per-user notification preference flags.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// `None` when the user never saved preferences.
    async fn get(&self, user_id: UserId) -> Result<Option<PreferenceFlags>, StoreError>;

    /// Overwrite only the flags that are `Some` in `update`.
    async fn upsert(
        &self,
        user_id: UserId,
        update: &PreferenceFlags,
    ) -> Result<PreferenceFlags, StoreError>;
}

/// Append-only delivery audit trail.
#[async_trait]
pub trait DeliveryLedger: Send + Sync {
    async fn append(&self, entry: &CreatePushLog) -> Result<DbId, StoreError>;

    async fn list_recent(
        &self,
        user_id: Option<UserId>,
        limit: i64,
    ) -> Result<Vec<PushLog>, StoreError>;
}

/// Every known user, for broadcast fan-out.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn list_users(&self) -> Result<Vec<Profile>, StoreError>;
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// The full set of collaborators, cheap to clone.
#[derive(Clone)]
pub struct Stores {
    pub subscriptions: Arc<dyn SubscriptionStore>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub ledger: Arc<dyn DeliveryLedger>,
    pub users: Arc<dyn UserDirectory>,
}

impl Stores {
    /// All collaborators backed by one PostgreSQL pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self::from_shared(Arc::new(PgStore::new(pool)))
    }

    /// All collaborators backed by a single value implementing every trait.
    pub fn from_shared<T>(store: Arc<T>) -> Self
    where
        T: SubscriptionStore + PreferenceStore + DeliveryLedger + UserDirectory + 'static,
    {
        Self {
            subscriptions: store.clone(),
            preferences: store.clone(),
            ledger: store.clone(),
            users: store,
        }
    }
}

// ---------------------------------------------------------------------------
// PostgreSQL adapter
// ---------------------------------------------------------------------------

/// Store implementation over the `barbershop-db` repositories.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for PgStore {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<PushSubscription>, StoreError> {
        Ok(PushSubscriptionRepo::list_for_user(&self.pool, user_id).await?)
    }

    async fn upsert(&self, input: &CreatePushSubscription) -> Result<PushSubscription, StoreError> {
        Ok(PushSubscriptionRepo::upsert(&self.pool, input).await?)
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(PushSubscriptionRepo::delete(&self.pool, id).await?)
    }

    async fn delete_by_endpoint(
        &self,
        user_id: UserId,
        endpoint: &str,
    ) -> Result<bool, StoreError> {
        Ok(PushSubscriptionRepo::delete_by_endpoint(&self.pool, user_id, endpoint).await?)
    }
}

#[async_trait]
impl PreferenceStore for PgStore {
    async fn get(&self, user_id: UserId) -> Result<Option<PreferenceFlags>, StoreError> {
        let row = NotificationPreferenceRepo::get(&self.pool, user_id).await?;
        Ok(row.map(|r| r.flags()))
    }

    async fn upsert(
        &self,
        user_id: UserId,
        update: &PreferenceFlags,
    ) -> Result<PreferenceFlags, StoreError> {
        let row = NotificationPreferenceRepo::upsert(&self.pool, user_id, update).await?;
        Ok(row.flags())
    }
}

#[async_trait]
impl DeliveryLedger for PgStore {
    async fn append(&self, entry: &CreatePushLog) -> Result<DbId, StoreError> {
        Ok(PushLogRepo::insert(&self.pool, entry).await?)
    }

    async fn list_recent(
        &self,
        user_id: Option<UserId>,
        limit: i64,
    ) -> Result<Vec<PushLog>, StoreError> {
        Ok(PushLogRepo::list_recent(&self.pool, user_id, limit).await?)
    }
}

#[async_trait]
impl UserDirectory for PgStore {
    async fn list_users(&self) -> Result<Vec<Profile>, StoreError> {
        Ok(ProfileRepo::list_all(&self.pool).await?)
    }
}
