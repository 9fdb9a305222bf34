//! Delivery outcome status recorded in the delivery ledger.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Time-to-live for push messages held by the push service (24 hours).
pub const DEFAULT_TTL_SECS: u32 = 86_400;

/// Outcome of one delivery invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// At least one subscription accepted the message.
    Sent,
    /// Subscriptions existed but none accepted the message.
    Failed,
    /// The user's preferences suppressed the notification.
    Skipped,
    /// The user has no registered subscriptions.
    NoSubscribers,
}

impl DeliveryStatus {
    /// Value stored in `push_notification_logs.status`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::NoSubscribers => "no_subscribers",
        }
    }

    /// Status for a completed fan-out.
    pub fn from_sent_count(sent: usize) -> Self {
        if sent > 0 {
            Self::Sent
        } else {
            Self::Failed
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            "skipped" => Ok(Self::Skipped),
            "no_subscribers" => Ok(Self::NoSubscribers),
            other => Err(CoreError::Validation(format!(
                "Unknown delivery status '{other}'"
            ))),
        }
    }
}
