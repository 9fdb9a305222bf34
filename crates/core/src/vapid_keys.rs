//! VAPID key codec: raw key bytes to JSON Web Key form.
//!
//! VAPID keys are stored in configuration as base64url raw bytes: the public
//! key is an uncompressed P-256 point (`0x04 || X || Y`, 65 bytes) and the
//! private key is the 32-byte scalar. Signing works from the JWK form, so the
//! conversion lives here as a pure function with strict length checks. Any
//! malformed key is rejected before cryptographic code ever sees it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::encoding::{decode_base64url, encode_base64url};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length of an uncompressed SEC1 P-256 public key.
pub const PUBLIC_KEY_LEN: usize = 65;

/// Length of a P-256 private scalar.
pub const PRIVATE_KEY_LEN: usize = 32;

/// Leading byte of an uncompressed SEC1 point.
pub const UNCOMPRESSED_POINT_TAG: u8 = 0x04;

/// Byte offset where the X coordinate starts.
const X_START: usize = 1;

/// Byte offset where the Y coordinate starts (end of X).
const Y_START: usize = 33;

/// Byte offset where the Y coordinate ends.
const Y_END: usize = 65;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Which half of the VAPID key pair a [`KeyFormatError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    Public,
    Private,
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str("public"),
            Self::Private => f.write_str("private"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum KeyFormatError {
    #[error("VAPID {role} key is not valid base64url: {source}")]
    Encoding {
        role: KeyRole,
        #[source]
        source: base64::DecodeError,
    },

    #[error("VAPID {role} key must be {expected} bytes, got {actual}")]
    Length {
        role: KeyRole,
        expected: usize,
        actual: usize,
    },

    #[error("VAPID public key must be an uncompressed point (0x04 prefix), got 0x{0:02x}")]
    NotUncompressed(u8),
}

// ---------------------------------------------------------------------------
// VapidJwk
// ---------------------------------------------------------------------------

/// An EC P-256 private key in JSON Web Key form (RFC 7517/7518).
///
/// `x`, `y` and `d` are unpadded base64url. `Debug` redacts `d`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VapidJwk {
    pub kty: String,
    pub crv: String,
    pub x: String,
    pub y: String,
    pub d: String,
}

impl fmt::Debug for VapidJwk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VapidJwk")
            .field("kty", &self.kty)
            .field("crv", &self.crv)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("d", &"<redacted>")
            .finish()
    }
}

/// Convert base64url-encoded raw VAPID keys into a [`VapidJwk`].
pub fn raw_keys_to_jwk(public_key: &str, private_key: &str) -> Result<VapidJwk, KeyFormatError> {
    let public = decode_base64url(public_key).map_err(|source| KeyFormatError::Encoding {
        role: KeyRole::Public,
        source,
    })?;
    let private = decode_base64url(private_key).map_err(|source| KeyFormatError::Encoding {
        role: KeyRole::Private,
        source,
    })?;
    jwk_from_raw(&public, &private)
}

/// Convert raw VAPID key bytes into a [`VapidJwk`].
///
/// `public` must be exactly [`PUBLIC_KEY_LEN`] bytes starting with
/// [`UNCOMPRESSED_POINT_TAG`]; `private` must be exactly [`PRIVATE_KEY_LEN`].
pub fn jwk_from_raw(public: &[u8], private: &[u8]) -> Result<VapidJwk, KeyFormatError> {
    if public.len() != PUBLIC_KEY_LEN {
        return Err(KeyFormatError::Length {
            role: KeyRole::Public,
            expected: PUBLIC_KEY_LEN,
            actual: public.len(),
        });
    }
    if public[0] != UNCOMPRESSED_POINT_TAG {
        return Err(KeyFormatError::NotUncompressed(public[0]));
    }
    if private.len() != PRIVATE_KEY_LEN {
        return Err(KeyFormatError::Length {
            role: KeyRole::Private,
            expected: PRIVATE_KEY_LEN,
            actual: private.len(),
        });
    }

    Ok(VapidJwk {
        kty: "EC".to_string(),
        crv: "P-256".to_string(),
        x: encode_base64url(&public[X_START..Y_START]),
        y: encode_base64url(&public[Y_START..Y_END]),
        d: encode_base64url(private),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
