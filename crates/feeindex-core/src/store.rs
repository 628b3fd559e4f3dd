//! Store capability — the persistence seam shared by the sync pipeline and
//! the read endpoint.
//!
//! Implementations live in `feeindex-storage` (memory, SQLite, Postgres).

use async_trait::async_trait;

use crate::error::IndexerError;
use crate::types::CanonicalFeeEvent;

/// Trait for storing and querying canonical fee events.
#[async_trait]
pub trait FeeEventStore: Send + Sync {
    /// Insert or replace the record keyed by `event.transaction_hash`.
    ///
    /// Re-applying the same event is a no-op in effect; applying a different
    /// event with the same hash overwrites every field (last write wins).
    async fn upsert(&self, event: &CanonicalFeeEvent) -> Result<(), IndexerError>;

    /// Highest `block_number` currently stored, or `None` for an empty store.
    async fn max_block_number(&self) -> Result<Option<u64>, IndexerError>;

    /// All events for `integrator` (ASCII case-insensitive), newest block first.
    async fn events_by_integrator(
        &self,
        integrator: &str,
    ) -> Result<Vec<CanonicalFeeEvent>, IndexerError>;
}
