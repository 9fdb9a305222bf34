//! Web Push protocol: payload encryption (RFC 8291), VAPID (RFC 8292) and
//! delivery to the push service over HTTP (RFC 8030).

pub mod encryption;
pub mod message;
pub mod transport;
pub mod vapid;

pub use encryption::EncryptionError;
pub use message::{Urgency, WebPushMessage};
pub use transport::{HttpPushTransport, PushError, PushTransport};
pub use vapid::{VapidError, VapidSigner};
