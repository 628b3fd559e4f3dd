//! feeindex-core — foundation for the `FeesCollected` block-range sync engine.
//!
//! # Architecture
//!
//! ```text
//! SyncScheduler (feeindex-evm)
//!     ├── CursorTracker   (resume point = max stored block + 1)
//!     ├── plan_ranges     (bounded, contiguous chunks)
//!     ├── EvmFetcher      (eth_getLogs per chunk)
//!     ├── normalize_all   (raw log → CanonicalFeeEvent, all or nothing)
//!     └── FeeEventStore   (idempotent upsert by transaction hash)
//! ```

pub mod cursor;
pub mod error;
pub mod indexer;
pub mod normalizer;
pub mod planner;
pub mod store;
pub mod types;

pub use cursor::CursorTracker;
pub use error::IndexerError;
pub use indexer::{CycleOutcome, CycleReport, IndexerConfig, SyncPhase};
pub use normalizer::{normalize, normalize_all};
pub use planner::plan_ranges;
pub use store::FeeEventStore;
pub use types::{BlockRange, CanonicalFeeEvent, LogArg, RawFeeLog};
