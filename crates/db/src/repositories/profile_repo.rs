//! Repository for the `profiles` table.

use barbershop_core::types::UserId;
use sqlx::PgPool;

use crate::models::profile::Profile;

/// Column list for `profiles` queries.
const COLUMNS: &str = "id, full_name, created_at";

/// Read access to the user directory.
pub struct ProfileRepo;

impl ProfileRepo {
    /// List every user, oldest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles ORDER BY created_at, id");
        sqlx::query_as::<_, Profile>(&query).fetch_all(pool).await
    }

    /// Insert a profile (used by seeding and tests; profiles are normally
    /// created by the identity provider hook).
    pub async fn create(
        pool: &PgPool,
        id: UserId,
        full_name: Option<&str>,
    ) -> Result<Profile, sqlx::Error> {
        let query = format!(
            "INSERT INTO profiles (id, full_name) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .bind(full_name)
            .fetch_one(pool)
            .await
    }
}
