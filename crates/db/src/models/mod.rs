//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus the input DTO used for inserts.

pub mod notification_preference;
pub mod profile;
pub mod push_log;
pub mod push_subscription;
