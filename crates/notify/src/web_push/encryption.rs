//! `aes128gcm` content encoding for Web Push messages.
//!
//! A fresh ephemeral P-256 key pair and salt are generated per message. The
//! shared secret with the subscription's `p256dh` key is combined with its
//! `auth` secret through HKDF-SHA256 into a content encryption key and nonce,
//! and the payload goes out as a single AES-128-GCM record:
//!
//! ```text
//! salt (16) | record size (u32 BE) | key id len (1) | key id (65) | ciphertext
//! ```

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Key, Nonce};
use barbershop_core::subscription::AUTH_SECRET_LEN;
use barbershop_core::vapid_keys::PUBLIC_KEY_LEN;
use hkdf::Hkdf;
use p256::ecdh::diffie_hellman;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{PublicKey, SecretKey};
use sha2::Sha256;

/// Record size advertised in the header.
pub const RECORD_SIZE: u32 = 4096;

pub const SALT_LEN: usize = 16;

/// Fixed header length: salt, record size, key id length and key id.
pub const HEADER_LEN: usize = SALT_LEN + 4 + 1 + PUBLIC_KEY_LEN;

const TAG_LEN: usize = 16;

/// Delimiter appended to the plaintext of the final (only) record.
const LAST_RECORD_DELIMITER: u8 = 0x02;

/// Largest payload that fits in one record.
pub const MAX_PLAINTEXT_LEN: usize = RECORD_SIZE as usize - HEADER_LEN - TAG_LEN - 1;

const WEB_PUSH_INFO: &[u8] = b"WebPush: info\0";
const CEK_INFO: &[u8] = b"Content-Encoding: aes128gcm\0";
const NONCE_INFO: &[u8] = b"Content-Encoding: nonce\0";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum EncryptionError {
    #[error("Subscription p256dh is not a valid P-256 public key")]
    InvalidClientKey,

    #[error("Subscription auth secret must be {AUTH_SECRET_LEN} bytes, got {0}")]
    InvalidAuthSecret(usize),

    #[error("Payload is {len} bytes, maximum is {max}")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("Key derivation failed")]
    KeyDerivation,

    #[error("Payload encryption failed")]
    Cipher,
}

// ---------------------------------------------------------------------------
// Encryption
// ---------------------------------------------------------------------------

/// Encrypt `plaintext` for a subscription with a fresh ephemeral key and salt.
pub fn encrypt(
    plaintext: &[u8],
    client_public_key: &[u8],
    auth_secret: &[u8],
) -> Result<Vec<u8>, EncryptionError> {
    let salt: [u8; SALT_LEN] = rand::random();
    encrypt_with(
        plaintext,
        client_public_key,
        auth_secret,
        &ephemeral_secret(),
        &salt,
    )
}

/// Encrypt with a caller-supplied server key and salt.
pub fn encrypt_with(
    plaintext: &[u8],
    client_public_key: &[u8],
    auth_secret: &[u8],
    server_secret: &SecretKey,
    salt: &[u8; SALT_LEN],
) -> Result<Vec<u8>, EncryptionError> {
    if plaintext.len() > MAX_PLAINTEXT_LEN {
        return Err(EncryptionError::PayloadTooLarge {
            len: plaintext.len(),
            max: MAX_PLAINTEXT_LEN,
        });
    }
    if auth_secret.len() != AUTH_SECRET_LEN {
        return Err(EncryptionError::InvalidAuthSecret(auth_secret.len()));
    }
    let client_key =
        PublicKey::from_sec1_bytes(client_public_key).map_err(|_| EncryptionError::InvalidClientKey)?;

    let client_point = client_key.to_encoded_point(false);
    let server_point = server_secret.public_key().to_encoded_point(false);
    let shared = diffie_hellman(server_secret.to_nonzero_scalar(), client_key.as_affine());

    let (cek, nonce) = derive_content_keys(
        shared.raw_secret_bytes().as_slice(),
        auth_secret,
        client_point.as_bytes(),
        server_point.as_bytes(),
        salt,
    )?;

    let mut record = Vec::with_capacity(plaintext.len() + 1);
    record.extend_from_slice(plaintext);
    record.push(LAST_RECORD_DELIMITER);

    let cipher = Aes128Gcm::new(Key::<Aes128Gcm>::from_slice(&cek));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), record.as_slice())
        .map_err(|_| EncryptionError::Cipher)?;

    let mut body = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    body.extend_from_slice(salt);
    body.extend_from_slice(&RECORD_SIZE.to_be_bytes());
    body.push(PUBLIC_KEY_LEN as u8);
    body.extend_from_slice(server_point.as_bytes());
    body.extend_from_slice(&ciphertext);
    Ok(body)
}

/// Derive the content encryption key and nonce for one message.
///
/// Both sides of the exchange use this: the sender with its ephemeral secret,
/// the user agent with its subscription secret.
pub(crate) fn derive_content_keys(
    shared_secret: &[u8],
    auth_secret: &[u8],
    client_public_key: &[u8],
    server_public_key: &[u8],
    salt: &[u8],
) -> Result<([u8; 16], [u8; 12]), EncryptionError> {
    let mut key_info =
        Vec::with_capacity(WEB_PUSH_INFO.len() + client_public_key.len() + server_public_key.len());
    key_info.extend_from_slice(WEB_PUSH_INFO);
    key_info.extend_from_slice(client_public_key);
    key_info.extend_from_slice(server_public_key);

    let mut ikm = [0u8; 32];
    Hkdf::<Sha256>::new(Some(auth_secret), shared_secret)
        .expand(&key_info, &mut ikm)
        .map_err(|_| EncryptionError::KeyDerivation)?;

    let content = Hkdf::<Sha256>::new(Some(salt), &ikm);
    let mut cek = [0u8; 16];
    let mut nonce = [0u8; 12];
    content
        .expand(CEK_INFO, &mut cek)
        .map_err(|_| EncryptionError::KeyDerivation)?;
    content
        .expand(NONCE_INFO, &mut nonce)
        .map_err(|_| EncryptionError::KeyDerivation)?;
    Ok((cek, nonce))
}

/// A random P-256 secret. Retries on the negligible chance the bytes are
/// not a valid scalar.
fn ephemeral_secret() -> SecretKey {
    loop {
        let bytes: [u8; 32] = rand::random();
        if let Ok(key) = SecretKey::from_slice(&bytes) {
            return key;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use barbershop_core::encoding::{decode_base64url, encode_base64url};

    use super::*;
    use crate::testing::{decrypt, TEST_AUTH, TEST_P256DH, TEST_UA_PRIVATE_KEY};

    // RFC 8291 Appendix A.
    const AS_PRIVATE: &str = "yfWPiYE-n46HLnH0KqZOF1fJJU3MYrct3AELtAQ-oRw";
    const SALT: &str = "DGv6ra1nlYgDCS1FRnbzlw";
    const PLAINTEXT: &[u8] = b"When I grow up, I want to be a watermelon";
    const EXPECTED: &str = "DGv6ra1nlYgDCS1FRnbzlwAAEABBBP4z9KsN6nGRTbVYI_c7VJSPQTBtkgcy27mlmlMoZIIgDll6e3vCYLocInmYWAmS6TlzAC8wEqKK6PBru3jl7A_yl95bQpu6cVPTpK4Mqgkf1CXztLVBSt2Ks3oZwbuwXPXLWyouBWLVWGNWQexSgSxsj_Qulcy4a-fN";

    fn client_keys() -> (Vec<u8>, Vec<u8>) {
        (
            decode_base64url(TEST_P256DH).unwrap(),
            decode_base64url(TEST_AUTH).unwrap(),
        )
    }

    #[test]
    fn matches_rfc8291_vector() {
        let (p256dh, auth) = client_keys();
        let server = SecretKey::from_slice(&decode_base64url(AS_PRIVATE).unwrap()).unwrap();
        let salt: [u8; SALT_LEN] = decode_base64url(SALT).unwrap().try_into().unwrap();

        let body = encrypt_with(PLAINTEXT, &p256dh, &auth, &server, &salt).unwrap();

        assert_eq!(encode_base64url(&body), EXPECTED);
    }

    #[test]
    fn random_encryption_round_trips_through_user_agent() {
        let (p256dh, auth) = client_keys();
        let ua_private = decode_base64url(TEST_UA_PRIVATE_KEY).unwrap();

        let first = encrypt(PLAINTEXT, &p256dh, &auth).unwrap();
        let second = encrypt(PLAINTEXT, &p256dh, &auth).unwrap();

        assert_ne!(first, second, "salt and ephemeral key must differ per message");
        assert_eq!(decrypt(&first, &ua_private, &auth), PLAINTEXT);
        assert_eq!(first.len(), HEADER_LEN + PLAINTEXT.len() + 1 + TAG_LEN);
    }

    #[test]
    fn max_payload_is_accepted_and_one_more_byte_is_not() {
        let (p256dh, auth) = client_keys();

        assert!(encrypt(&vec![b'x'; MAX_PLAINTEXT_LEN], &p256dh, &auth).is_ok());
        assert_matches!(
            encrypt(&vec![b'x'; MAX_PLAINTEXT_LEN + 1], &p256dh, &auth),
            Err(EncryptionError::PayloadTooLarge { len: 3994, max: 3993 })
        );
    }

    #[test]
    fn rejects_bad_client_material() {
        let (p256dh, auth) = client_keys();

        assert_matches!(
            encrypt(PLAINTEXT, &p256dh[..33], &auth),
            Err(EncryptionError::InvalidClientKey)
        );
        assert_matches!(
            encrypt(PLAINTEXT, &p256dh, &auth[..8]),
            Err(EncryptionError::InvalidAuthSecret(8))
        );
    }
}
