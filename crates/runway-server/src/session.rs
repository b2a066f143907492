//! In-memory holder for the most recently uploaded transaction table

use std::sync::Arc;

use runway_core::TransactionRecord;
use tokio::sync::RwLock;

/// Shared slot for the current table
///
/// Readers take an `Arc` snapshot and release the lock before running any
/// analysis, so an upload that lands mid-request swaps the slot without
/// touching the table that request is reading.
#[derive(Default)]
pub struct SessionStore {
    table: RwLock<Option<Arc<Vec<TransactionRecord>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored table
    pub async fn replace(&self, records: Vec<TransactionRecord>) {
        let mut table = self.table.write().await;
        *table = Some(Arc::new(records));
    }

    /// Snapshot of the current table, if one was uploaded
    pub async fn snapshot(&self) -> Option<Arc<Vec<TransactionRecord>>> {
        self.table.read().await.clone()
    }
}
