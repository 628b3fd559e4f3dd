//! feeindex-storage — fee event store backends.
//!
//! Backends:
//! - [`memory`] — in-memory (dev/testing, no persistence)
//! - `sqlite` — SQLite via `sqlx` (embedded, single-file persistence)
//! - `postgres` — PostgreSQL via `sqlx`
//!
//! [`connect`] picks a backend from a connection string.

use std::sync::Arc;

use feeindex_core::error::IndexerError;
use feeindex_core::store::FeeEventStore;

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryFeeStore;

/// Backend selected by a connection string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Sqlite,
    Postgres,
}

impl StoreKind {
    /// `memory` / `memory://` → memory, `postgres://` / `postgresql://` →
    /// Postgres, anything else (`sqlite:` URL or a plain path) → SQLite.
    pub fn from_url(url: &str) -> Self {
        let url = url.trim();
        if url == "memory" || url.starts_with("memory://") {
            Self::Memory
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Self::Postgres
        } else {
            Self::Sqlite
        }
    }
}

/// Open the store named by `url`.
pub async fn connect(url: &str) -> Result<Arc<dyn FeeEventStore>, IndexerError> {
    let kind = StoreKind::from_url(url);
    tracing::info!(backend = ?kind, "Opening fee event store");

    match kind {
        StoreKind::Memory => Ok(Arc::new(MemoryFeeStore::new())),

        #[cfg(feature = "sqlite")]
        StoreKind::Sqlite => Ok(Arc::new(sqlite::SqliteFeeStore::open(url.trim()).await?)),
        #[cfg(not(feature = "sqlite"))]
        StoreKind::Sqlite => Err(IndexerError::Config(format!(
            "store url {url:?} needs the `sqlite` feature"
        ))),

        #[cfg(feature = "postgres")]
        StoreKind::Postgres => Ok(Arc::new(postgres::PostgresFeeStore::connect(url.trim()).await?)),
        #[cfg(not(feature = "postgres"))]
        StoreKind::Postgres => Err(IndexerError::Config(
            "postgres store urls need the `postgres` feature".into(),
        )),
    }
}

#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub(crate) fn storage_err(e: sqlx::Error) -> IndexerError {
    IndexerError::Storage(e.to_string())
}

#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub(crate) fn block_to_i64(block: u64) -> Result<i64, IndexerError> {
    i64::try_from(block).map_err(|_| IndexerError::Storage(format!("block {block} out of range")))
}
