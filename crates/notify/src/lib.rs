//! Push notification delivery.
//!
//! - [`PushNotifier`]: the delivery engine. Gates on user preferences, fans a
//!   payload out to every subscription of a user over Web Push, reaps dead
//!   endpoints and writes one ledger row per invocation.
//! - [`PreferenceGate`], [`ExpiryReaper`], [`LedgerWriter`]: the pieces the
//!   engine composes.
//! - [`store`]: storage traits and the PostgreSQL adapter.
//! - [`web_push`]: message encryption, VAPID signing and HTTP transport.

pub mod engine;
pub mod error;
pub mod gate;
pub mod ledger;
pub mod reaper;
pub mod store;
pub mod web_push;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use engine::{
    BroadcastReport, BroadcastRequest, DeliveryOptions, DeliveryReport, DeliveryRequest,
    PushNotifier,
};
pub use error::NotifyError;
pub use gate::{GateDecision, PreferenceGate};
pub use ledger::LedgerWriter;
pub use reaper::ExpiryReaper;
pub use store::{PgStore, StoreError, Stores};
pub use web_push::{HttpPushTransport, PushError, PushTransport, VapidSigner};
