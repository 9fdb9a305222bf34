use crate::store::StoreError;

/// Errors that fail a whole delivery invocation.
///
/// Per-subscription failures never surface here; they are folded into the
/// report's error list.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("VAPID keys not configured")]
    NotConfigured,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
