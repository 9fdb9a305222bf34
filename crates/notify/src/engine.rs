//! Delivery engine.
//!
//! [`PushNotifier::send_to_user`] runs one delivery invocation:
//!
//! 1. Require VAPID keys. Without them nothing happens, not even a ledger row.
//! 2. Ask the [`PreferenceGate`]. A suppressed type is ledgered as `skipped`.
//! 3. Load the user's subscriptions. None at all is ledgered as
//!    `no_subscribers`.
//! 4. Serialize the payload once, then encrypt and send it to every
//!    subscription concurrently (bounded by [`DeliveryOptions::concurrency`]).
//!    Failures stay per subscription. 404/410 answers hand the subscription to
//!    the [`ExpiryReaper`].
//! 5. Write exactly one ledger row summarizing the invocation.
//!
//! [`PushNotifier::broadcast`] repeats steps 2 to 5 for every user and then
//! writes one aggregate row.

use std::sync::Arc;

use barbershop_core::delivery::{DeliveryStatus, DEFAULT_TTL_SECS};
use barbershop_core::payload::{NotificationPayload, DEFAULT_ICON};
use barbershop_core::types::UserId;
use barbershop_db::models::push_log::CreatePushLog;
use barbershop_db::models::push_subscription::PushSubscription;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::error::NotifyError;
use crate::gate::{GateDecision, PreferenceGate};
use crate::ledger::LedgerWriter;
use crate::reaper::ExpiryReaper;
use crate::store::Stores;
use crate::web_push::{PushError, PushTransport, Urgency, VapidSigner, WebPushMessage};

/// Default number of in-flight sends per invocation.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// `user_name` on the aggregate broadcast ledger row.
pub const BROADCAST_LEDGER_NAME: &str = "broadcast";

// ---------------------------------------------------------------------------
// Options, requests and reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DeliveryOptions {
    pub ttl_secs: u32,
    pub urgency: Urgency,
    pub concurrency: usize,
    pub default_icon: String,
}

impl Default for DeliveryOptions {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TTL_SECS,
            urgency: Urgency::Normal,
            concurrency: DEFAULT_CONCURRENCY,
            default_icon: DEFAULT_ICON.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeliveryRequest {
    pub user_id: UserId,
    /// Denormalized into the ledger row.
    pub user_name: Option<String>,
    pub notification_type: String,
    pub payload: NotificationPayload,
}

/// Result of one invocation, serialized as the HTTP response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryReport {
    pub success: bool,
    pub sent: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
    #[serde(skip)]
    pub status: DeliveryStatus,
}

impl DeliveryReport {
    fn skipped() -> Self {
        Self {
            success: true,
            sent: 0,
            total: None,
            errors: None,
            skipped: true,
            status: DeliveryStatus::Skipped,
        }
    }

    fn no_subscribers() -> Self {
        Self {
            success: true,
            sent: 0,
            total: Some(0),
            errors: None,
            skipped: false,
            status: DeliveryStatus::NoSubscribers,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BroadcastRequest {
    pub notification_type: String,
    pub payload: NotificationPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BroadcastReport {
    pub success: bool,
    /// Users the broadcast was run for.
    pub users: usize,
    pub sent: usize,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// PushNotifier
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PushNotifier {
    signer: Option<Arc<VapidSigner>>,
    transport: Arc<dyn PushTransport>,
    stores: Stores,
    gate: PreferenceGate,
    reaper: ExpiryReaper,
    ledger: LedgerWriter,
    options: DeliveryOptions,
}

impl PushNotifier {
    /// `signer` is `None` when the deployment has no VAPID keys; every
    /// delivery then fails with [`NotifyError::NotConfigured`].
    pub fn new(
        stores: Stores,
        transport: Arc<dyn PushTransport>,
        signer: Option<VapidSigner>,
        options: DeliveryOptions,
    ) -> Self {
        Self {
            signer: signer.map(Arc::new),
            transport,
            gate: PreferenceGate::new(stores.preferences.clone()),
            reaper: ExpiryReaper::new(stores.subscriptions.clone()),
            ledger: LedgerWriter::new(stores.ledger.clone()),
            stores,
            options,
        }
    }

    pub fn vapid_public_key(&self) -> Result<&str, NotifyError> {
        Ok(self.signer()?.public_key())
    }

    fn signer(&self) -> Result<&VapidSigner, NotifyError> {
        self.signer.as_deref().ok_or(NotifyError::NotConfigured)
    }

    /// Deliver to every subscription of one user.
    pub async fn send_to_user(
        &self,
        request: &DeliveryRequest,
    ) -> Result<DeliveryReport, NotifyError> {
        let signer = self.signer()?;
        self.deliver(signer, request).await
    }

    /// Deliver to every user in the directory, one user at a time.
    pub async fn broadcast(
        &self,
        request: &BroadcastRequest,
    ) -> Result<BroadcastReport, NotifyError> {
        let signer = self.signer()?;

        let users = match self.stores.users.list_users().await {
            Ok(users) => users,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load users for broadcast");
                self.ledger
                    .record(&ledger_entry(
                        None,
                        Some(BROADCAST_LEDGER_NAME.to_string()),
                        &request.notification_type,
                        &request.payload,
                        DeliveryStatus::Failed,
                        0,
                        0,
                        Some(format!("Failed to load users: {e}")),
                    ))
                    .await;
                return Err(e.into());
            }
        };

        let mut sent = 0;
        let mut total = 0;
        let mut errors = Vec::new();

        for user in &users {
            let per_user = DeliveryRequest {
                user_id: user.id,
                user_name: user.full_name.clone(),
                notification_type: request.notification_type.clone(),
                payload: request.payload.clone(),
            };
            match self.deliver(signer, &per_user).await {
                Ok(report) => {
                    sent += report.sent;
                    total += report.total.unwrap_or(0);
                    errors.extend(report.errors.unwrap_or_default());
                }
                Err(e) => errors.push(format!("{}: {e}", user.id)),
            }
        }

        let status = if total == 0 {
            DeliveryStatus::NoSubscribers
        } else {
            DeliveryStatus::from_sent_count(sent)
        };
        tracing::info!(
            users = users.len(),
            sent,
            total,
            failed = errors.len(),
            status = %status,
            "Broadcast finished"
        );
        self.ledger
            .record(&ledger_entry(
                None,
                Some(BROADCAST_LEDGER_NAME.to_string()),
                &request.notification_type,
                &request.payload,
                status,
                sent,
                total,
                join_errors(&errors),
            ))
            .await;

        Ok(BroadcastReport {
            success: true,
            users: users.len(),
            sent,
            total,
            errors: (!errors.is_empty()).then_some(errors),
        })
    }

    async fn deliver(
        &self,
        signer: &VapidSigner,
        request: &DeliveryRequest,
    ) -> Result<DeliveryReport, NotifyError> {
        let user_id = request.user_id;
        let entry = |status: DeliveryStatus,
                     sent: usize,
                     total: usize,
                     details: Option<String>| {
            ledger_entry(
                Some(user_id),
                request.user_name.clone(),
                &request.notification_type,
                &request.payload,
                status,
                sent,
                total,
                details,
            )
        };

        if let GateDecision::Suppress { flag } =
            self.gate.check(user_id, &request.notification_type).await
        {
            tracing::debug!(
                user_id = %user_id,
                notification_type = %request.notification_type,
                flag = flag.column(),
                "Notification suppressed by user preference"
            );
            let note = format!("Suppressed: user disabled '{}'", flag.column());
            self.ledger
                .record(&entry(DeliveryStatus::Skipped, 0, 0, Some(note)))
                .await;
            return Ok(DeliveryReport::skipped());
        }

        let subscriptions = match self.stores.subscriptions.list_for_user(user_id).await {
            Ok(subscriptions) => subscriptions,
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Failed to load push subscriptions");
                let note = format!("Failed to load subscriptions: {e}");
                self.ledger
                    .record(&entry(DeliveryStatus::Failed, 0, 0, Some(note)))
                    .await;
                return Err(e.into());
            }
        };

        if subscriptions.is_empty() {
            tracing::info!(user_id = %user_id, "No push subscriptions for user");
            self.ledger
                .record(&entry(DeliveryStatus::NoSubscribers, 0, 0, None))
                .await;
            return Ok(DeliveryReport::no_subscribers());
        }

        let body = request.payload.to_wire_bytes(&self.options.default_icon);
        let total = subscriptions.len();

        // Built up front so the fan-out future stays `Send` for axum handlers.
        let sends: Vec<BoxFuture<'_, Result<(), String>>> = subscriptions
            .iter()
            .map(|subscription| self.deliver_one(signer, subscription, &body).boxed())
            .collect();
        let outcomes: Vec<Result<(), String>> = stream::iter(sends)
            .buffer_unordered(self.options.concurrency.max(1))
            .collect()
            .await;

        let errors: Vec<String> = outcomes.into_iter().filter_map(Result::err).collect();
        let sent = total - errors.len();
        let status = DeliveryStatus::from_sent_count(sent);

        tracing::info!(
            user_id = %user_id,
            notification_type = %request.notification_type,
            sent,
            total,
            status = %status,
            "Push delivery finished"
        );
        self.ledger
            .record(&entry(status, sent, total, join_errors(&errors)))
            .await;

        Ok(DeliveryReport {
            success: true,
            sent,
            total: Some(total),
            errors: (!errors.is_empty()).then_some(errors),
            skipped: false,
            status,
        })
    }

    /// Send to one subscription. The error string names the endpoint.
    async fn deliver_one(
        &self,
        signer: &VapidSigner,
        subscription: &PushSubscription,
        body: &[u8],
    ) -> Result<(), String> {
        let Err(e) = self.send(signer, subscription, body).await else {
            return Ok(());
        };

        if e.is_expired() {
            tracing::info!(
                subscription_id = subscription.id,
                endpoint = %subscription.endpoint,
                error = %e,
                "Push endpoint expired"
            );
            if let Err(reap_err) = self.reaper.reap(subscription.id).await {
                tracing::error!(
                    subscription_id = subscription.id,
                    error = %reap_err,
                    "Failed to remove expired push subscription"
                );
            }
        } else {
            tracing::warn!(
                subscription_id = subscription.id,
                endpoint = %subscription.endpoint,
                error = %e,
                "Push delivery failed"
            );
        }
        Err(format!("{}: {e}", subscription.endpoint))
    }

    async fn send(
        &self,
        signer: &VapidSigner,
        subscription: &PushSubscription,
        body: &[u8],
    ) -> Result<(), PushError> {
        let message = WebPushMessage::build(
            subscription,
            body,
            signer,
            self.options.ttl_secs,
            self.options.urgency,
        )?;
        self.transport.send(&message).await
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn ledger_entry(
    user_id: Option<UserId>,
    user_name: Option<String>,
    notification_type: &str,
    payload: &NotificationPayload,
    status: DeliveryStatus,
    sent: usize,
    total: usize,
    error_details: Option<String>,
) -> CreatePushLog {
    CreatePushLog {
        user_id,
        user_name,
        notification_type: notification_type.to_string(),
        title: payload.title.clone(),
        body: payload.body.clone(),
        status,
        sent_count: i32::try_from(sent).unwrap_or(i32::MAX),
        total_subscriptions: i32::try_from(total).unwrap_or(i32::MAX),
        error_details,
    }
}

fn join_errors(errors: &[String]) -> Option<String> {
    (!errors.is_empty()).then(|| errors.join("; "))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
