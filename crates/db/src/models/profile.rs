use barbershop_core::types::{Timestamp, UserId};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `profiles` table (the user directory).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profile {
    pub id: UserId,
    pub full_name: Option<String>,
    pub created_at: Timestamp,
}
