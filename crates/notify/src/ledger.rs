//! Best-effort writer for the delivery ledger.

use std::sync::Arc;

use barbershop_core::types::DbId;
use barbershop_db::models::push_log::CreatePushLog;

use crate::store::DeliveryLedger;

#[derive(Clone)]
pub struct LedgerWriter {
    ledger: Arc<dyn DeliveryLedger>,
}

impl LedgerWriter {
    pub fn new(ledger: Arc<dyn DeliveryLedger>) -> Self {
        Self { ledger }
    }

    /// Append one ledger row. A failed write is logged and swallowed so it
    /// never changes the delivery outcome.
    pub async fn record(&self, entry: &CreatePushLog) -> Option<DbId> {
        match self.ledger.append(entry).await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::error!(
                    user_id = ?entry.user_id,
                    notification_type = %entry.notification_type,
                    status = %entry.status,
                    error = %e,
                    "Failed to write push delivery ledger entry"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use barbershop_core::delivery::DeliveryStatus;

    use super::*;
    use crate::testing::MemoryStore;

    fn entry() -> CreatePushLog {
        CreatePushLog {
            user_id: None,
            user_name: Some("broadcast".into()),
            notification_type: "admin_broadcast".into(),
            title: "Cerrado".into(),
            body: "Hoy cerramos antes".into(),
            status: DeliveryStatus::Sent,
            sent_count: 3,
            total_subscriptions: 4,
            error_details: None,
        }
    }

    #[tokio::test]
    async fn record_appends_row() {
        let store = Arc::new(MemoryStore::new());
        let id = LedgerWriter::new(store.clone()).record(&entry()).await;

        assert!(id.is_some());
        let logs = store.logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, "sent");
        assert_eq!(logs[0].sent_count, 3);
    }

    #[tokio::test]
    async fn write_failure_is_swallowed() {
        let store = Arc::new(MemoryStore::new());
        store.fail_ledger_writes(true);

        assert_eq!(LedgerWriter::new(store.clone()).record(&entry()).await, None);
        assert!(store.logs().is_empty());
    }
}
