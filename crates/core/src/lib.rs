//! Pure domain logic for the barbershop push notification service.
//!
//! Nothing in this crate performs I/O. It is shared by the repository layer,
//! the delivery engine and the HTTP API.

pub mod delivery;
pub mod encoding;
pub mod error;
pub mod payload;
pub mod preferences;
pub mod subscription;
pub mod types;
pub mod vapid_keys;
