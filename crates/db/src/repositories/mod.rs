//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod notification_preference_repo;
pub mod profile_repo;
pub mod push_log_repo;
pub mod push_subscription_repo;

pub use notification_preference_repo::NotificationPreferenceRepo;
pub use profile_repo::ProfileRepo;
pub use push_log_repo::PushLogRepo;
pub use push_subscription_repo::PushSubscriptionRepo;
