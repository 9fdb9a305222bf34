//! Test doubles: an in-memory store, a scripted push transport and fixed
//! key material.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Key, Nonce};
use async_trait::async_trait;
use barbershop_core::preferences::PreferenceFlags;
use barbershop_core::types::{DbId, UserId};
use barbershop_db::models::profile::Profile;
use barbershop_db::models::push_log::{CreatePushLog, PushLog};
use barbershop_db::models::push_subscription::{CreatePushSubscription, PushSubscription};
use chrono::Utc;
use p256::ecdh::diffie_hellman;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{PublicKey, SecretKey};

use crate::store::{DeliveryLedger, PreferenceStore, StoreError, SubscriptionStore, UserDirectory};
use crate::web_push::encryption::{derive_content_keys, HEADER_LEN, SALT_LEN};
use crate::web_push::{PushError, PushTransport, VapidSigner, WebPushMessage};

// ---------------------------------------------------------------------------
// Key material (RFC 8291 Appendix A user agent keys)
// ---------------------------------------------------------------------------

pub const TEST_P256DH: &str =
    "BCVxsr7N_eNgVRqvHtD0zTZsEc6-VV-JvLexhqUzORcxaOzi6-AYWXvTBHm4bjyPjs7Vd8pZGH6SRpkNtoIAiw4";
pub const TEST_UA_PRIVATE_KEY: &str = "q1dXpw3UpT5VOmu_cf_v6ih07Aems3njxI-JWgLcM94";
pub const TEST_AUTH: &str = "BTBZMqHH6r4Tts7J_aSIgg";

/// The same pair doubles as the server's VAPID keys.
pub const TEST_VAPID_PUBLIC_KEY: &str = TEST_P256DH;
pub const TEST_VAPID_PRIVATE_KEY: &str = TEST_UA_PRIVATE_KEY;

pub fn test_signer() -> VapidSigner {
    VapidSigner::from_raw_keys(
        TEST_VAPID_PUBLIC_KEY,
        TEST_VAPID_PRIVATE_KEY,
        "mailto:test@barbershop.local",
    )
    .expect("test VAPID keys are valid")
}

/// A subscription row carrying the test client keys.
pub fn subscription(id: DbId, user_id: UserId, endpoint: &str) -> PushSubscription {
    let now = Utc::now();
    PushSubscription {
        id,
        user_id,
        endpoint: endpoint.to_string(),
        p256dh: TEST_P256DH.to_string(),
        auth: TEST_AUTH.to_string(),
        created_at: now,
        updated_at: now,
    }
}

/// Decrypt a message body as the user agent would.
pub fn decrypt(body: &[u8], client_private_key: &[u8], auth_secret: &[u8]) -> Vec<u8> {
    let salt = &body[..SALT_LEN];
    let server_public = &body[SALT_LEN + 5..HEADER_LEN];
    let ciphertext = &body[HEADER_LEN..];

    let client_secret = SecretKey::from_slice(client_private_key).expect("client private key");
    let server_key = PublicKey::from_sec1_bytes(server_public).expect("server public key");
    let client_public = client_secret.public_key().to_encoded_point(false);
    let shared = diffie_hellman(client_secret.to_nonzero_scalar(), server_key.as_affine());

    let (cek, nonce) = derive_content_keys(
        shared.raw_secret_bytes().as_slice(),
        auth_secret,
        client_public.as_bytes(),
        server_public,
        salt,
    )
    .expect("key derivation");

    let mut record = Aes128Gcm::new(Key::<Aes128Gcm>::from_slice(&cek))
        .decrypt(Nonce::from_slice(&nonce), ciphertext)
        .expect("authentic ciphertext");
    assert_eq!(record.pop(), Some(0x02), "last record delimiter");
    record
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryState {
    next_id: DbId,
    subscriptions: Vec<PushSubscription>,
    preferences: HashMap<UserId, PreferenceFlags>,
    logs: Vec<PushLog>,
    profiles: Vec<Profile>,
}

impl MemoryState {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

/// Implements every store trait over plain collections. Reads and writes can
/// be made to fail on demand.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    fail_subscription_reads: AtomicBool,
    fail_preference_reads: AtomicBool,
    fail_ledger_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_profile(&self, id: UserId, full_name: Option<&str>) {
        self.state().profiles.push(Profile {
            id,
            full_name: full_name.map(str::to_string),
            created_at: Utc::now(),
        });
    }

    pub fn add_subscription(&self, user_id: UserId, endpoint: &str) -> PushSubscription {
        let mut state = self.state();
        let sub = subscription(state.next_id(), user_id, endpoint);
        state.subscriptions.push(sub.clone());
        sub
    }

    /// Overwrite the stored `auth` secret of one subscription.
    pub fn set_subscription_auth(&self, id: DbId, auth: &str) {
        if let Some(sub) = self.state().subscriptions.iter_mut().find(|s| s.id == id) {
            sub.auth = auth.to_string();
        }
    }

    pub fn set_preferences(&self, user_id: UserId, flags: PreferenceFlags) {
        self.state().preferences.insert(user_id, flags);
    }

    pub fn subscriptions_for(&self, user_id: UserId) -> Vec<PushSubscription> {
        self.state()
            .subscriptions
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Ledger rows in insertion order.
    pub fn logs(&self) -> Vec<PushLog> {
        self.state().logs.clone()
    }

    pub fn fail_subscription_reads(&self, fail: bool) {
        self.fail_subscription_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_preference_reads(&self, fail: bool) {
        self.fail_preference_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_ledger_writes(&self, fail: bool) {
        self.fail_ledger_writes.store(fail, Ordering::SeqCst);
    }
}

fn injected(what: &str) -> StoreError {
    StoreError::Backend(format!("injected {what} failure"))
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<PushSubscription>, StoreError> {
        if self.fail_subscription_reads.load(Ordering::SeqCst) {
            return Err(injected("subscription read"));
        }
        Ok(self.subscriptions_for(user_id))
    }

    async fn upsert(&self, input: &CreatePushSubscription) -> Result<PushSubscription, StoreError> {
        let mut state = self.state();
        let now = Utc::now();
        if let Some(existing) = state
            .subscriptions
            .iter_mut()
            .find(|s| s.endpoint == input.endpoint)
        {
            existing.user_id = input.user_id;
            existing.p256dh = input.p256dh.clone();
            existing.auth = input.auth.clone();
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let sub = PushSubscription {
            id: state.next_id(),
            user_id: input.user_id,
            endpoint: input.endpoint.clone(),
            p256dh: input.p256dh.clone(),
            auth: input.auth.clone(),
            created_at: now,
            updated_at: now,
        };
        state.subscriptions.push(sub.clone());
        Ok(sub)
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        let mut state = self.state();
        let before = state.subscriptions.len();
        state.subscriptions.retain(|s| s.id != id);
        Ok(state.subscriptions.len() != before)
    }

    async fn delete_by_endpoint(
        &self,
        user_id: UserId,
        endpoint: &str,
    ) -> Result<bool, StoreError> {
        let mut state = self.state();
        let before = state.subscriptions.len();
        state
            .subscriptions
            .retain(|s| !(s.user_id == user_id && s.endpoint == endpoint));
        Ok(state.subscriptions.len() != before)
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn get(&self, user_id: UserId) -> Result<Option<PreferenceFlags>, StoreError> {
        if self.fail_preference_reads.load(Ordering::SeqCst) {
            return Err(injected("preference read"));
        }
        Ok(self.state().preferences.get(&user_id).copied())
    }

    async fn upsert(
        &self,
        user_id: UserId,
        update: &PreferenceFlags,
    ) -> Result<PreferenceFlags, StoreError> {
        let mut state = self.state();
        // New rows start with every flag enabled, like the column defaults.
        let row = state.preferences.entry(user_id).or_insert(PreferenceFlags {
            booking_confirmations: Some(true),
            booking_reminders: Some(true),
            chat_messages: Some(true),
            giveaways: Some(true),
            promotions: Some(true),
        });
        row.booking_confirmations = update.booking_confirmations.or(row.booking_confirmations);
        row.booking_reminders = update.booking_reminders.or(row.booking_reminders);
        row.chat_messages = update.chat_messages.or(row.chat_messages);
        row.giveaways = update.giveaways.or(row.giveaways);
        row.promotions = update.promotions.or(row.promotions);
        Ok(*row)
    }
}

#[async_trait]
impl DeliveryLedger for MemoryStore {
    async fn append(&self, entry: &CreatePushLog) -> Result<DbId, StoreError> {
        if self.fail_ledger_writes.load(Ordering::SeqCst) {
            return Err(injected("ledger write"));
        }
        let mut state = self.state();
        let id = state.next_id();
        state.logs.push(PushLog {
            id,
            user_id: entry.user_id,
            user_name: entry.user_name.clone(),
            notification_type: entry.notification_type.clone(),
            title: entry.title.clone(),
            body: entry.body.clone(),
            status: entry.status.as_str().to_string(),
            sent_count: entry.sent_count,
            total_subscriptions: entry.total_subscriptions,
            error_details: entry.error_details.clone(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list_recent(
        &self,
        user_id: Option<UserId>,
        limit: i64,
    ) -> Result<Vec<PushLog>, StoreError> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .state()
            .logs
            .iter()
            .rev()
            .filter(|log| user_id.is_none() || log.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn list_users(&self) -> Result<Vec<Profile>, StoreError> {
        Ok(self.state().profiles.clone())
    }
}

// ---------------------------------------------------------------------------
// ScriptedTransport
// ---------------------------------------------------------------------------

/// Records every message and answers with a per-endpoint HTTP status
/// (201 unless scripted otherwise), optionally after a delay.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<String, u16>>,
    sent: Mutex<Vec<WebPushMessage>>,
    delay: Mutex<Option<Duration>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_with(&self, endpoint: &str, status: u16) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(endpoint.to_string(), status);
    }

    /// Hold every send for `delay` before answering.
    pub fn delay_responses(&self, delay: Duration) {
        *self.delay.lock().unwrap_or_else(PoisonError::into_inner) = Some(delay);
    }

    /// Every message handed to the transport, in send order.
    pub fn sent(&self) -> Vec<WebPushMessage> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn attempts(&self) -> usize {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl PushTransport for ScriptedTransport {
    async fn send(&self, message: &WebPushMessage) -> Result<(), PushError> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.clone());

        let delay = *self.delay.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let status = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&message.endpoint)
            .copied()
            .unwrap_or(201);

        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(PushError::HttpStatus(status))
        }
    }
}
