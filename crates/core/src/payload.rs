//! Notification payload and its canonical wire form.

use serde::{Deserialize, Serialize};

/// Icon used for `icon` and `badge` when the caller leaves them out.
pub const DEFAULT_ICON: &str = "/icons/icon-192x192.png";

/// An actionable button shown with the notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// What the service worker displays. Built fresh per call, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub badge: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    /// Opaque routing data for the client (e.g. `{ "url": "/chat" }`).
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub actions: Option<Vec<NotificationAction>>,
}

impl NotificationPayload {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            icon: None,
            badge: None,
            tag: None,
            data: None,
            actions: None,
        }
    }

    /// Serialize to the single byte form every subscription receives.
    ///
    /// All seven keys are always present: `icon` and `badge` fall back to
    /// `default_icon`, `tag` is `null` when unset, `data` defaults to `{}` and
    /// `actions` to `[]`.
    pub fn to_wire_bytes(&self, default_icon: &str) -> Vec<u8> {
        let data = self
            .data
            .clone()
            .unwrap_or_else(|| serde_json::Value::Object(Default::default()));
        let actions = self.actions.as_deref().unwrap_or_default();

        serde_json::json!({
            "title": self.title,
            "body": self.body,
            "icon": self.icon.as_deref().unwrap_or(default_icon),
            "badge": self.badge.as_deref().unwrap_or(default_icon),
            "tag": self.tag,
            "data": data,
            "actions": actions,
        })
        .to_string()
        .into_bytes()
    }
}
