//! SQLite fee event store.
//!
//! Persists canonical fee events to a single SQLite file, one row per
//! transaction hash. Uses `sqlx` with WAL mode for concurrent reads while the
//! scheduler writes.
//!
//! # Usage
//! ```rust,no_run
//! use feeindex_storage::sqlite::SqliteFeeStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // File-backed (persistent)
//! let store = SqliteFeeStore::open("./feeindex.db").await?;
//!
//! // In-memory (tests / ephemeral)
//! let store = SqliteFeeStore::in_memory().await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use feeindex_core::error::IndexerError;
use feeindex_core::store::FeeEventStore;
use feeindex_core::types::CanonicalFeeEvent;

use crate::{block_to_i64, storage_err};

/// SQLite-backed fee event store.
pub struct SqliteFeeStore {
    pool: SqlitePool,
}

impl SqliteFeeStore {
    /// Open (or create) a SQLite database at `path`.
    ///
    /// The path may be a plain file path (`"./feeindex.db"`) or a full
    /// SQLite URL (`"sqlite:./feeindex.db?mode=rwc"`).
    pub async fn open(path: &str) -> Result<Self, IndexerError> {
        let url = if path.starts_with("sqlite:") {
            path.to_string()
        } else {
            format!("sqlite:{path}?mode=rwc")
        };

        let pool = SqlitePool::connect(&url).await.map_err(storage_err)?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Open an in-memory SQLite database. All data is lost when the pool is
    /// dropped.
    pub async fn in_memory() -> Result<Self, IndexerError> {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .map_err(storage_err)?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), IndexerError> {
        sqlx::query("PRAGMA journal_mode=WAL;")
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS fee_events (
                transaction_hash TEXT    PRIMARY KEY,
                block_number     INTEGER NOT NULL,
                token            TEXT    NOT NULL,
                integrator       TEXT    NOT NULL,
                integrator_fee   TEXT    NOT NULL,
                lifi_fee         TEXT    NOT NULL
            );",
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_fee_events_block ON fee_events (block_number);")
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_fee_events_integrator ON fee_events (lower(integrator));",
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }

    /// Total number of stored records.
    pub async fn event_count(&self) -> Result<u64, IndexerError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM fee_events")
            .fetch_one(&self.pool)
            .await
            .map_err(storage_err)?;

        let cnt: i64 = row.try_get("cnt").map_err(storage_err)?;
        Ok(cnt as u64)
    }
}

fn event_from_row(row: &SqliteRow) -> Result<CanonicalFeeEvent, IndexerError> {
    let block: i64 = row.try_get("block_number").map_err(storage_err)?;
    Ok(CanonicalFeeEvent {
        transaction_hash: row.try_get("transaction_hash").map_err(storage_err)?,
        block_number: u64::try_from(block)
            .map_err(|_| IndexerError::Storage(format!("negative block number {block}")))?,
        token: row.try_get("token").map_err(storage_err)?,
        integrator: row.try_get("integrator").map_err(storage_err)?,
        integrator_fee: row.try_get("integrator_fee").map_err(storage_err)?,
        lifi_fee: row.try_get("lifi_fee").map_err(storage_err)?,
    })
}

#[async_trait]
impl FeeEventStore for SqliteFeeStore {
    async fn upsert(&self, event: &CanonicalFeeEvent) -> Result<(), IndexerError> {
        sqlx::query(
            "INSERT INTO fee_events
             (transaction_hash, block_number, token, integrator, integrator_fee, lifi_fee)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT (transaction_hash) DO UPDATE SET
                block_number   = excluded.block_number,
                token          = excluded.token,
                integrator     = excluded.integrator,
                integrator_fee = excluded.integrator_fee,
                lifi_fee       = excluded.lifi_fee",
        )
        .bind(&event.transaction_hash)
        .bind(block_to_i64(event.block_number)?)
        .bind(&event.token)
        .bind(&event.integrator)
        .bind(&event.integrator_fee)
        .bind(&event.lifi_fee)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        debug!(tx = %event.transaction_hash, block = event.block_number, "fee event upserted");
        Ok(())
    }

    async fn max_block_number(&self) -> Result<Option<u64>, IndexerError> {
        let row = sqlx::query("SELECT MAX(block_number) AS max_block FROM fee_events")
            .fetch_one(&self.pool)
            .await
            .map_err(storage_err)?;

        let max: Option<i64> = row.try_get("max_block").map_err(storage_err)?;
        Ok(max.map(|b| b as u64))
    }

    async fn events_by_integrator(
        &self,
        integrator: &str,
    ) -> Result<Vec<CanonicalFeeEvent>, IndexerError> {
        let rows = sqlx::query(
            "SELECT transaction_hash, block_number, token, integrator, integrator_fee, lifi_fee
             FROM fee_events WHERE lower(integrator) = lower(?)
             ORDER BY block_number DESC, transaction_hash",
        )
        .bind(integrator)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.iter().map(event_from_row).collect()
    }
}
