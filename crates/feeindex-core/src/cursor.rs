//! Cursor tracker — derives the resume point from stored data.
//!
//! No checkpoint is persisted separately: the highest stored block number *is*
//! the cursor. An empty store resumes from the configured start block.

use std::sync::Arc;

use crate::error::IndexerError;
use crate::store::FeeEventStore;

/// Computes the next block to fetch on demand.
#[derive(Clone)]
pub struct CursorTracker {
    store: Arc<dyn FeeEventStore>,
    start_block: u64,
}

impl CursorTracker {
    pub fn new(store: Arc<dyn FeeEventStore>, start_block: u64) -> Self {
        Self { store, start_block }
    }

    /// Next block to fetch: `max stored block + 1`, or the start block when the
    /// store is empty.
    pub async fn resume_point(&self) -> Result<u64, IndexerError> {
        let resume = match self.store.max_block_number().await? {
            Some(max) => max.saturating_add(1),
            None => self.start_block,
        };
        tracing::debug!(resume, "resume point");
        Ok(resume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CanonicalFeeEvent;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MaxOnly(Mutex<Option<u64>>);

    #[async_trait]
    impl FeeEventStore for MaxOnly {
        async fn upsert(&self, event: &CanonicalFeeEvent) -> Result<(), IndexerError> {
            let mut max = self.0.lock().unwrap();
            *max = Some(max.map_or(event.block_number, |m| m.max(event.block_number)));
            Ok(())
        }

        async fn max_block_number(&self) -> Result<Option<u64>, IndexerError> {
            Ok(*self.0.lock().unwrap())
        }

        async fn events_by_integrator(
            &self,
            _integrator: &str,
        ) -> Result<Vec<CanonicalFeeEvent>, IndexerError> {
            Ok(vec![])
        }
    }

    struct Broken;

    #[async_trait]
    impl FeeEventStore for Broken {
        async fn upsert(&self, _event: &CanonicalFeeEvent) -> Result<(), IndexerError> {
            Err(IndexerError::Storage("down".into()))
        }

        async fn max_block_number(&self) -> Result<Option<u64>, IndexerError> {
            Err(IndexerError::Storage("down".into()))
        }

        async fn events_by_integrator(
            &self,
            _integrator: &str,
        ) -> Result<Vec<CanonicalFeeEvent>, IndexerError> {
            Err(IndexerError::Storage("down".into()))
        }
    }

    fn event_at(block: u64) -> CanonicalFeeEvent {
        CanonicalFeeEvent {
            transaction_hash: format!("0x{block:064x}"),
            block_number: block,
            token: "0x0".into(),
            integrator: "0x1".into(),
            integrator_fee: "0".into(),
            lifi_fee: "0".into(),
        }
    }

    #[tokio::test]
    async fn empty_store_resumes_at_start_block() {
        let cursor = CursorTracker::new(Arc::new(MaxOnly::default()), 61_500_000);
        assert_eq!(cursor.resume_point().await.unwrap(), 61_500_000);
    }

    #[tokio::test]
    async fn resumes_after_highest_stored_block() {
        let store = Arc::new(MaxOnly::default());
        store.upsert(&event_at(61_500_120)).await.unwrap();
        store.upsert(&event_at(61_500_090)).await.unwrap();

        let cursor = CursorTracker::new(store, 61_500_000);
        assert_eq!(cursor.resume_point().await.unwrap(), 61_500_121);
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let cursor = CursorTracker::new(Arc::new(Broken), 0);
        assert!(cursor.resume_point().await.unwrap_err().is_storage());
    }
}
