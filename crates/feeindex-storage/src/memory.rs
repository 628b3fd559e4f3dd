//! In-memory fee event store.
//!
//! Keeps one record per transaction hash in RAM. Useful for tests and
//! throwaway runs; all data is lost when the process exits.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use feeindex_core::error::IndexerError;
use feeindex_core::store::FeeEventStore;
use feeindex_core::types::CanonicalFeeEvent;

/// In-memory fee event store.
#[derive(Default)]
pub struct MemoryFeeStore {
    events: Mutex<HashMap<String, CanonicalFeeEvent>>,
}

impl MemoryFeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events().is_empty()
    }

    /// Look up one record by transaction hash.
    pub fn get(&self, tx_hash: &str) -> Option<CanonicalFeeEvent> {
        self.events().get(tx_hash).cloned()
    }

    fn events(&self) -> MutexGuard<'_, HashMap<String, CanonicalFeeEvent>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl FeeEventStore for MemoryFeeStore {
    async fn upsert(&self, event: &CanonicalFeeEvent) -> Result<(), IndexerError> {
        self.events()
            .insert(event.transaction_hash.clone(), event.clone());
        Ok(())
    }

    async fn max_block_number(&self) -> Result<Option<u64>, IndexerError> {
        Ok(self.events().values().map(|e| e.block_number).max())
    }

    async fn events_by_integrator(
        &self,
        integrator: &str,
    ) -> Result<Vec<CanonicalFeeEvent>, IndexerError> {
        let mut found: Vec<_> = self
            .events()
            .values()
            .filter(|e| e.integrator.eq_ignore_ascii_case(integrator))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.block_number
                .cmp(&a.block_number)
                .then_with(|| a.transaction_hash.cmp(&b.transaction_hash))
        });
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "0x1Bcc58D165e5374D7B492B21c0a572Fd61C0C2a0";
    const BOB: &str = "0x0000000000000000000000000000000000000B0b";

    fn ev(tx: &str, block: u64, integrator: &str, fee: &str) -> CanonicalFeeEvent {
        CanonicalFeeEvent {
            transaction_hash: tx.into(),
            block_number: block,
            token: "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174".into(),
            integrator: integrator.into(),
            integrator_fee: fee.into(),
            lifi_fee: "0".into(),
        }
    }

    #[tokio::test]
    async fn empty_store_has_no_max_block() {
        let store = MemoryFeeStore::new();
        assert!(store.is_empty());
        assert_eq!(store.max_block_number().await.unwrap(), None);
        assert!(store.events_by_integrator(ALICE).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upsert_is_keyed_by_transaction_hash() {
        let store = MemoryFeeStore::new();
        store.upsert(&ev("0x01", 100, ALICE, "5")).await.unwrap();
        store.upsert(&ev("0x01", 100, ALICE, "5")).await.unwrap();
        assert_eq!(store.len(), 1);

        // Last write wins.
        store.upsert(&ev("0x01", 120, BOB, "9")).await.unwrap();
        assert_eq!(store.len(), 1);
        let stored = store.get("0x01").unwrap();
        assert_eq!(stored.block_number, 120);
        assert_eq!(stored.integrator, BOB);
        assert_eq!(stored.integrator_fee, "9");
    }

    #[tokio::test]
    async fn max_block_tracks_highest_record() {
        let store = MemoryFeeStore::new();
        store.upsert(&ev("0x01", 300, ALICE, "1")).await.unwrap();
        store.upsert(&ev("0x02", 100, BOB, "1")).await.unwrap();
        assert_eq!(store.max_block_number().await.unwrap(), Some(300));
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive_and_newest_first() {
        let store = MemoryFeeStore::new();
        store.upsert(&ev("0x0b", 100, ALICE, "1")).await.unwrap();
        store.upsert(&ev("0x0c", 200, ALICE, "2")).await.unwrap();
        store.upsert(&ev("0x0a", 100, ALICE, "3")).await.unwrap();
        store.upsert(&ev("0x0d", 150, BOB, "4")).await.unwrap();

        let found = store.events_by_integrator(&ALICE.to_lowercase()).await.unwrap();
        let order: Vec<_> = found.iter().map(|e| e.transaction_hash.as_str()).collect();
        assert_eq!(order, vec!["0x0c", "0x0a", "0x0b"]);

        assert!(store
            .events_by_integrator("0x000000000000000000000000000000000000dEaD")
            .await
            .unwrap()
            .is_empty());
    }
}
