use barbershop_core::delivery::DEFAULT_TTL_SECS;
use barbershop_core::payload::DEFAULT_ICON;
use barbershop_notify::engine::DEFAULT_CONCURRENCY;
use barbershop_notify::web_push::{Urgency, VapidError};
use barbershop_notify::{DeliveryOptions, VapidSigner};

/// Default VAPID `sub` claim when `VAPID_SUBJECT` is not set.
const DEFAULT_VAPID_SUBJECT: &str = "mailto:admin@barbershop.local";

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Web Push delivery settings.
    pub push: PushConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            push: PushConfig::from_env(),
        }
    }
}

// ---------------------------------------------------------------------------
// PushConfig
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PushConfigError {
    #[error("VAPID_PUBLIC_KEY and VAPID_PRIVATE_KEY must be set together")]
    PartialKeys,

    #[error("Invalid VAPID keys: {0}")]
    Vapid(#[from] VapidError),
}

/// Web Push settings. The VAPID keys are optional as a pair: without them
/// the server still runs but every delivery answers "not configured".
#[derive(Clone)]
pub struct PushConfig {
    /// Base64url uncompressed P-256 public key.
    pub vapid_public_key: Option<String>,
    /// Base64url P-256 private scalar.
    pub vapid_private_key: Option<String>,
    pub vapid_subject: String,
    pub ttl_secs: u32,
    /// Maximum in-flight sends per delivery.
    pub concurrency: usize,
    /// Fallback for the payload `icon` and `badge`.
    pub default_icon: String,
}

impl std::fmt::Debug for PushConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushConfig")
            .field("vapid_public_key", &self.vapid_public_key)
            .field(
                "vapid_private_key",
                &self.vapid_private_key.as_ref().map(|_| "<redacted>"),
            )
            .field("vapid_subject", &self.vapid_subject)
            .field("ttl_secs", &self.ttl_secs)
            .field("concurrency", &self.concurrency)
            .field("default_icon", &self.default_icon)
            .finish()
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            vapid_public_key: None,
            vapid_private_key: None,
            vapid_subject: DEFAULT_VAPID_SUBJECT.to_string(),
            ttl_secs: DEFAULT_TTL_SECS,
            concurrency: DEFAULT_CONCURRENCY,
            default_icon: DEFAULT_ICON.to_string(),
        }
    }
}

impl PushConfig {
    /// Load from environment variables. Empty values count as unset.
    ///
    /// | Env Var             | Default                          |
    /// |---------------------|----------------------------------|
    /// | `VAPID_PUBLIC_KEY`  | none                             |
    /// | `VAPID_PRIVATE_KEY` | none                             |
    /// | `VAPID_SUBJECT`     | `mailto:admin@barbershop.local`  |
    /// | `PUSH_TTL_SECS`     | `86400`                          |
    /// | `PUSH_CONCURRENCY`  | `8`                              |
    /// | `PUSH_DEFAULT_ICON` | `/icons/icon-192x192.png`        |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let ttl_secs: u32 = non_empty_var("PUSH_TTL_SECS")
            .map(|v| v.parse().expect("PUSH_TTL_SECS must be a valid u32"))
            .unwrap_or(defaults.ttl_secs);

        let concurrency: usize = non_empty_var("PUSH_CONCURRENCY")
            .map(|v| v.parse().expect("PUSH_CONCURRENCY must be a valid usize"))
            .unwrap_or(defaults.concurrency);
        assert!(concurrency > 0, "PUSH_CONCURRENCY must be at least 1");

        Self {
            vapid_public_key: non_empty_var("VAPID_PUBLIC_KEY"),
            vapid_private_key: non_empty_var("VAPID_PRIVATE_KEY"),
            vapid_subject: non_empty_var("VAPID_SUBJECT").unwrap_or(defaults.vapid_subject),
            ttl_secs,
            concurrency,
            default_icon: non_empty_var("PUSH_DEFAULT_ICON").unwrap_or(defaults.default_icon),
        }
    }

    /// Build the VAPID signer.
    ///
    /// `Ok(None)` when neither key is set. A lone key or malformed keys are
    /// errors, meant to stop the process at startup.
    pub fn build_signer(&self) -> Result<Option<VapidSigner>, PushConfigError> {
        match (&self.vapid_public_key, &self.vapid_private_key) {
            (None, None) => Ok(None),
            (Some(public), Some(private)) => Ok(Some(VapidSigner::from_raw_keys(
                public,
                private,
                self.vapid_subject.clone(),
            )?)),
            _ => Err(PushConfigError::PartialKeys),
        }
    }

    pub fn delivery_options(&self) -> DeliveryOptions {
        DeliveryOptions {
            ttl_secs: self.ttl_secs,
            urgency: Urgency::Normal,
            concurrency: self.concurrency,
            default_icon: self.default_icon.clone(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use barbershop_core::vapid_keys::KeyFormatError;
    use barbershop_notify::testing::{TEST_VAPID_PRIVATE_KEY, TEST_VAPID_PUBLIC_KEY};

    use super::*;

    fn with_keys(public: Option<&str>, private: Option<&str>) -> PushConfig {
        PushConfig {
            vapid_public_key: public.map(str::to_string),
            vapid_private_key: private.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn no_keys_means_unconfigured() {
        assert!(with_keys(None, None).build_signer().unwrap().is_none());
    }

    #[test]
    fn both_keys_build_a_signer() {
        let signer = with_keys(Some(TEST_VAPID_PUBLIC_KEY), Some(TEST_VAPID_PRIVATE_KEY))
            .build_signer()
            .unwrap()
            .unwrap();
        assert_eq!(signer.public_key(), TEST_VAPID_PUBLIC_KEY);
        assert_eq!(signer.subject(), DEFAULT_VAPID_SUBJECT);
    }

    #[test]
    fn lone_key_is_rejected() {
        assert_matches!(
            with_keys(Some(TEST_VAPID_PUBLIC_KEY), None).build_signer(),
            Err(PushConfigError::PartialKeys)
        );
        assert_matches!(
            with_keys(None, Some(TEST_VAPID_PRIVATE_KEY)).build_signer(),
            Err(PushConfigError::PartialKeys)
        );
    }

    #[test]
    fn truncated_private_key_is_rejected() {
        assert_matches!(
            with_keys(Some(TEST_VAPID_PUBLIC_KEY), Some("q1dXpw3UpT5VOmu_cf_v6ih07Aems3nj"))
                .build_signer(),
            Err(PushConfigError::Vapid(VapidError::KeyFormat(
                KeyFormatError::Length { .. }
            )))
        );
    }

    #[test]
    fn debug_redacts_private_key() {
        let rendered = format!(
            "{:?}",
            with_keys(Some(TEST_VAPID_PUBLIC_KEY), Some(TEST_VAPID_PRIVATE_KEY))
        );
        assert!(!rendered.contains(TEST_VAPID_PRIVATE_KEY));
    }

    #[test]
    fn delivery_options_follow_config() {
        let config = PushConfig {
            ttl_secs: 60,
            concurrency: 2,
            ..Default::default()
        };
        let options = config.delivery_options();
        assert_eq!(options.ttl_secs, 60);
        assert_eq!(options.concurrency, 2);
        assert_eq!(options.default_icon, DEFAULT_ICON);
    }
}
