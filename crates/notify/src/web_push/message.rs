//! A fully prepared push request for one subscription.

use barbershop_core::encoding::decode_base64url;
use barbershop_db::models::push_subscription::PushSubscription;

use super::encryption;
use super::transport::PushError;
use super::vapid::VapidSigner;

/// RFC 8030 `Urgency` header values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Urgency {
    VeryLow,
    Low,
    #[default]
    Normal,
    High,
}

impl Urgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VeryLow => "very-low",
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }
}

/// Encrypted body plus the headers the push service needs.
#[derive(Debug, Clone)]
pub struct WebPushMessage {
    pub endpoint: String,
    pub ttl: u32,
    pub urgency: Urgency,
    /// `vapid t=..., k=...`
    pub authorization: String,
    pub body: Vec<u8>,
}

impl WebPushMessage {
    /// Encrypt `payload` for `subscription` and sign for its push service.
    pub fn build(
        subscription: &PushSubscription,
        payload: &[u8],
        signer: &VapidSigner,
        ttl: u32,
        urgency: Urgency,
    ) -> Result<Self, PushError> {
        let p256dh = decode_base64url(&subscription.p256dh)
            .map_err(|e| PushError::InvalidSubscription(format!("p256dh: {e}")))?;
        let auth = decode_base64url(&subscription.auth)
            .map_err(|e| PushError::InvalidSubscription(format!("auth: {e}")))?;

        Ok(Self {
            endpoint: subscription.endpoint.clone(),
            ttl,
            urgency,
            authorization: signer.authorization(&subscription.endpoint)?,
            body: encryption::encrypt(payload, &p256dh, &auth)?,
        })
    }
}
