//! Base64url helpers for Web Push key material.
//!
//! Browsers hand out `p256dh`/`auth` values and VAPID tooling prints keys in
//! base64url without padding, but some clients pad or use the standard
//! alphabet. Decoding accepts all of those; encoding always produces
//! unpadded base64url.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// Encode bytes as unpadded base64url.
pub fn encode_base64url(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode base64url (or standard base64), with or without padding.
pub fn decode_base64url(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let trimmed = input.trim();
    URL_SAFE_LENIENT
        .decode(trimmed)
        .or_else(|err| STANDARD_LENIENT.decode(trimmed).map_err(|_| err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_is_unpadded_url_safe() {
        assert_eq!(encode_base64url([0xfb, 0xff]), "-_8");
    }

    #[test]
    fn decode_accepts_padding_and_standard_alphabet() {
        assert_eq!(decode_base64url("-_8").unwrap(), vec![0xfb, 0xff]);
        assert_eq!(decode_base64url("-_8=").unwrap(), vec![0xfb, 0xff]);
        assert_eq!(decode_base64url("+/8=").unwrap(), vec![0xfb, 0xff]);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_base64url("not base64!").is_err());
    }
}
