/// Primary keys owned by this service are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// User ids are issued by the hosted identity provider.
pub type UserId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
