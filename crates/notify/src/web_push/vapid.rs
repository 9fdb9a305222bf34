//! VAPID application server identification (RFC 8292).
//!
//! Each push request carries an ES256 JWT whose audience is the push
//! service origin, plus the server's public key:
//! `Authorization: vapid t=<jwt>, k=<public key>`.

use std::fmt;

use barbershop_core::encoding::{decode_base64url, encode_base64url};
use barbershop_core::vapid_keys::{raw_keys_to_jwk, KeyFormatError, KeyRole, VapidJwk};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::EncodePrivateKey;
use p256::SecretKey;
use serde::Serialize;

/// Lifetime of a signed token. RFC 8292 caps this at 24 hours.
pub const TOKEN_LIFETIME_HOURS: i64 = 12;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum VapidError {
    #[error(transparent)]
    KeyFormat(#[from] KeyFormatError),

    #[error("VAPID private key is not a valid P-256 scalar")]
    InvalidPrivateKey,

    #[error("VAPID public key does not match the private key")]
    KeyMismatch,

    #[error("Push endpoint is not a valid URL: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("Push endpoint has no origin")]
    OpaqueOrigin,

    #[error("Failed to sign VAPID token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

// ---------------------------------------------------------------------------
// VapidSigner
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct VapidClaims<'a> {
    aud: String,
    exp: i64,
    sub: &'a str,
}

/// Signs VAPID tokens with the server's key pair.
#[derive(Clone)]
pub struct VapidSigner {
    encoding_key: EncodingKey,
    public_key: String,
    subject: String,
}

impl fmt::Debug for VapidSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VapidSigner")
            .field("public_key", &self.public_key)
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

impl VapidSigner {
    /// Build from base64url raw keys as stored in configuration.
    pub fn from_raw_keys(
        public_key: &str,
        private_key: &str,
        subject: impl Into<String>,
    ) -> Result<Self, VapidError> {
        let jwk = raw_keys_to_jwk(public_key, private_key)?;
        Self::from_jwk(&jwk, subject)
    }

    /// Build from a JWK, checking that `x`/`y` belong to `d`.
    pub fn from_jwk(jwk: &VapidJwk, subject: impl Into<String>) -> Result<Self, VapidError> {
        let d = decode_base64url(&jwk.d).map_err(|source| KeyFormatError::Encoding {
            role: KeyRole::Private,
            source,
        })?;
        let secret = SecretKey::from_slice(&d).map_err(|_| VapidError::InvalidPrivateKey)?;

        let point = secret.public_key().to_encoded_point(false);
        let (Some(x), Some(y)) = (point.x(), point.y()) else {
            return Err(VapidError::InvalidPrivateKey);
        };
        if encode_base64url(x) != jwk.x || encode_base64url(y) != jwk.y {
            return Err(VapidError::KeyMismatch);
        }

        let der = secret
            .to_pkcs8_der()
            .map_err(|_| VapidError::InvalidPrivateKey)?;

        Ok(Self {
            encoding_key: EncodingKey::from_ec_der(der.as_bytes()),
            public_key: encode_base64url(point.as_bytes()),
            subject: subject.into(),
        })
    }

    /// Server public key as unpadded base64url, as browsers expect for
    /// `applicationServerKey`.
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Sign a token for the push service that owns `endpoint`.
    pub fn sign(&self, endpoint: &str, now: DateTime<Utc>) -> Result<String, VapidError> {
        let claims = VapidClaims {
            aud: audience(endpoint)?,
            exp: (now + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp(),
            sub: &self.subject,
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::ES256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// `Authorization` header value for a request to `endpoint`.
    pub fn authorization(&self, endpoint: &str) -> Result<String, VapidError> {
        let token = self.sign(endpoint, Utc::now())?;
        Ok(format!("vapid t={token}, k={}", self.public_key))
    }
}

/// The push service origin (`scheme://host[:port]`).
fn audience(endpoint: &str) -> Result<String, VapidError> {
    let origin = url::Url::parse(endpoint)?.origin();
    if !origin.is_tuple() {
        return Err(VapidError::OpaqueOrigin);
    }
    Ok(origin.ascii_serialization())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use jsonwebtoken::{DecodingKey, Validation};

    use super::*;
    use crate::testing::{test_signer, TEST_VAPID_PRIVATE_KEY, TEST_VAPID_PUBLIC_KEY};

    const JWK_X: &str = "JXGyvs3942BVGq8e0PTNNmwRzr5VX4m8t7GGpTM5FzE";
    const JWK_Y: &str = "aOzi6-AYWXvTBHm4bjyPjs7Vd8pZGH6SRpkNtoIAiw4";
    const ENDPOINT: &str = "https://fcm.googleapis.com/fcm/send/abc123";

    #[derive(Debug, serde::Deserialize)]
    struct Claims {
        aud: String,
        exp: i64,
        sub: String,
    }

    fn verify(token: &str, audience: &str) -> Claims {
        let key = DecodingKey::from_ec_components(JWK_X, JWK_Y).unwrap();
        let mut validation = Validation::new(Algorithm::ES256);
        validation.set_audience(&[audience]);
        jsonwebtoken::decode::<Claims>(token, &key, &validation)
            .unwrap()
            .claims
    }

    #[test]
    fn public_key_is_reported_as_configured() {
        assert_eq!(test_signer().public_key(), TEST_VAPID_PUBLIC_KEY);
    }

    #[test]
    fn token_verifies_with_public_key() {
        let now = Utc::now();
        let token = test_signer().sign(ENDPOINT, now).unwrap();

        let claims = verify(&token, "https://fcm.googleapis.com");
        assert_eq!(claims.aud, "https://fcm.googleapis.com");
        assert_eq!(claims.sub, "mailto:test@barbershop.local");
        assert_eq!(claims.exp, (now + Duration::hours(12)).timestamp());
    }

    #[test]
    fn audience_keeps_non_default_port() {
        let token = test_signer()
            .sign("https://push.example.com:8443/sub/1", Utc::now())
            .unwrap();
        assert_eq!(
            verify(&token, "https://push.example.com:8443").aud,
            "https://push.example.com:8443"
        );
    }

    #[test]
    fn authorization_header_format() {
        let header = test_signer().authorization(ENDPOINT).unwrap();
        let rest = header.strip_prefix("vapid t=").unwrap();
        let (token, key) = rest.split_once(", k=").unwrap();

        assert_eq!(key, TEST_VAPID_PUBLIC_KEY);
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn rejects_public_key_from_another_pair() {
        // RFC 8291 application server public key paired with the user agent
        // private key.
        let other = "BP4z9KsN6nGRTbVYI_c7VJSPQTBtkgcy27mlmlMoZIIgDll6e3vCYLocInmYWAmS6TlzAC8wEqKK6PBru3jl7A8";
        assert_matches!(
            VapidSigner::from_raw_keys(other, TEST_VAPID_PRIVATE_KEY, "mailto:x@y"),
            Err(VapidError::KeyMismatch)
        );
    }

    #[test]
    fn rejects_malformed_keys() {
        assert_matches!(
            VapidSigner::from_raw_keys("BAAA", TEST_VAPID_PRIVATE_KEY, "mailto:x@y"),
            Err(VapidError::KeyFormat(KeyFormatError::Length { .. }))
        );
    }

    #[test]
    fn rejects_relative_endpoint() {
        assert_matches!(
            test_signer().sign("/not/absolute", Utc::now()),
            Err(VapidError::Endpoint(_))
        );
    }

    #[test]
    fn debug_hides_key_material() {
        let rendered = format!("{:?}", test_signer());
        assert!(!rendered.contains(TEST_VAPID_PRIVATE_KEY));
    }
}
