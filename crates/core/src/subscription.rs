//! Validation for push subscription registrations.

use crate::encoding::decode_base64url;
use crate::error::CoreError;
use crate::vapid_keys::{PUBLIC_KEY_LEN, UNCOMPRESSED_POINT_TAG};

/// Length of the user agent authentication secret (RFC 8291).
pub const AUTH_SECRET_LEN: usize = 16;

/// Maximum accepted endpoint URL length.
const MAX_ENDPOINT_LEN: usize = 2048;

/// Validate a push service endpoint URL. Push services are HTTPS-only.
pub fn validate_endpoint(endpoint: &str) -> Result<(), CoreError> {
    if endpoint.len() > MAX_ENDPOINT_LEN {
        return Err(CoreError::Validation(format!(
            "Endpoint exceeds {MAX_ENDPOINT_LEN} characters"
        )));
    }
    let url = url::Url::parse(endpoint)
        .map_err(|e| CoreError::Validation(format!("Endpoint is not a valid URL: {e}")))?;
    if url.scheme() != "https" {
        return Err(CoreError::Validation(
            "Endpoint must use https".to_string(),
        ));
    }
    if url.host_str().is_none() {
        return Err(CoreError::Validation("Endpoint has no host".to_string()));
    }
    Ok(())
}

/// Validate the `p256dh` and `auth` values a browser reported.
pub fn validate_client_keys(p256dh: &str, auth: &str) -> Result<(), CoreError> {
    let public = decode_base64url(p256dh)
        .map_err(|e| CoreError::Validation(format!("p256dh is not valid base64url: {e}")))?;
    if public.len() != PUBLIC_KEY_LEN || public[0] != UNCOMPRESSED_POINT_TAG {
        return Err(CoreError::Validation(format!(
            "p256dh must be a {PUBLIC_KEY_LEN}-byte uncompressed P-256 point"
        )));
    }

    let secret = decode_base64url(auth)
        .map_err(|e| CoreError::Validation(format!("auth is not valid base64url: {e}")))?;
    if secret.len() != AUTH_SECRET_LEN {
        return Err(CoreError::Validation(format!(
            "auth must be {AUTH_SECRET_LEN} bytes, got {}",
            secret.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const P256DH: &str =
        "BCVxsr7N_eNgVRqvHtD0zTZsEc6-VV-JvLexhqUzORcxaOzi6-AYWXvTBHm4bjyPjs7Vd8pZGH6SRpkNtoIAiw4";
    const AUTH: &str = "BTBZMqHH6r4Tts7J_aSIgg";

    #[test]
    fn accepts_https_endpoint() {
        assert!(validate_endpoint("https://fcm.googleapis.com/fcm/send/abc").is_ok());
    }

    #[test]
    fn rejects_plain_http_and_garbage() {
        assert_matches!(
            validate_endpoint("http://push.example.com/x"),
            Err(CoreError::Validation(_))
        );
        assert_matches!(validate_endpoint("not a url"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn accepts_browser_keys() {
        assert!(validate_client_keys(P256DH, AUTH).is_ok());
    }

    #[test]
    fn rejects_short_auth_secret() {
        let err = validate_client_keys(P256DH, "AAAA").unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: auth must be 16 bytes, got 3");
    }

    #[test]
    fn rejects_compressed_p256dh() {
        assert_matches!(
            validate_client_keys("AgAA", AUTH),
            Err(CoreError::Validation(_))
        );
    }
}
