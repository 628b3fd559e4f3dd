//! The sync scheduler — drives block-range sync cycles.
//!
//! # One cycle
//! 1. Resume point from the cursor tracker, chain head from the fetcher.
//!    Nothing to do when the resume point is past the head.
//! 2. Split `[resume, head]` into chunks with `to - from <= chunk_size`.
//! 3. For each chunk, strictly ascending: fetch logs → normalize all →
//!    upsert one by one. Pause `chunk_delay` between chunks.
//!
//! Any error ends the cycle and is returned unchanged. Events upserted before
//! the failure stay stored; the next cycle resumes from the highest stored
//! block and rewrites whatever it meets again with identical content.
//!
//! # Ticks
//! [`SyncScheduler::run`] ticks every `poll_interval`, the first tick
//! immediately. A tick that finds a cycle in flight is skipped, never queued
//! and never run concurrently.

use std::future::Future;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinSet;
use tokio::time::{interval, MissedTickBehavior};

use feeindex_core::cursor::CursorTracker;
use feeindex_core::error::IndexerError;
use feeindex_core::indexer::{CycleOutcome, CycleReport, IndexerConfig, SyncPhase};
use feeindex_core::normalizer::normalize_all;
use feeindex_core::planner::plan_ranges;
use feeindex_core::store::FeeEventStore;
use feeindex_core::types::BlockRange;

use crate::fetcher::{EvmFetcher, EvmRpcClient};

/// Single-worker scheduler for the fee sync pipeline.
pub struct SyncScheduler<C> {
    config: IndexerConfig,
    fetcher: EvmFetcher<C>,
    store: Arc<dyn FeeEventStore>,
    cursor: CursorTracker,
    phase: Mutex<SyncPhase>,
    in_flight: Arc<AsyncMutex<()>>,
}

impl<C: EvmRpcClient + 'static> SyncScheduler<C> {
    /// Fails when the configured contract address does not parse.
    pub fn new(
        config: IndexerConfig,
        client: C,
        store: Arc<dyn FeeEventStore>,
    ) -> Result<Self, IndexerError> {
        let fetcher = EvmFetcher::new(client, config.contract()?);
        let cursor = CursorTracker::new(Arc::clone(&store), config.start_block);
        Ok(Self {
            config,
            fetcher,
            store,
            cursor,
            phase: Mutex::new(SyncPhase::Idle),
            in_flight: Arc::new(AsyncMutex::new(())),
        })
    }

    pub fn fetcher(&self) -> &EvmFetcher<C> {
        &self.fetcher
    }

    /// Current phase of the running (or last) cycle.
    pub fn phase(&self) -> SyncPhase {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_phase(&self, phase: SyncPhase) {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner()) = phase;
    }

    /// Run one cycle to completion, unless another one is in flight.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, IndexerError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            self.skipped_tick();
            return Ok(CycleOutcome::Skipped);
        };
        self.cycle().await
    }

    /// Tick every `poll_interval` until a cycle fails, then return its error.
    pub async fn run(self: Arc<Self>) -> Result<(), IndexerError> {
        let mut ticker = interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut cycles = JoinSet::new();

        tracing::info!(
            contract = %self.config.contract_address,
            start_block = self.config.start_block,
            chunk_size = self.config.chunk_size,
            poll_interval_ms = self.config.poll_interval_ms,
            "Starting fee sync scheduler"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => match self.guarded_cycle() {
                    Some(cycle) => {
                        cycles.spawn(cycle);
                    }
                    None => self.skipped_tick(),
                },
                Some(joined) = cycles.join_next() => match joined {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => return Err(e),
                    Err(e) => {
                        return Err(IndexerError::Aborted { reason: e.to_string() });
                    }
                },
            }
        }
    }

    /// Take the in-flight guard and package a cycle that releases it on exit.
    fn guarded_cycle(
        self: &Arc<Self>,
    ) -> Option<impl Future<Output = Result<CycleOutcome, IndexerError>> + Send + 'static> {
        let guard = Arc::clone(&self.in_flight).try_lock_owned().ok()?;
        let this = Arc::clone(self);
        Some(async move {
            let _guard = guard;
            this.cycle().await
        })
    }

    fn skipped_tick(&self) {
        tracing::warn!(phase = %self.phase(), "Previous sync cycle still running, skipping tick");
    }

    async fn cycle(&self) -> Result<CycleOutcome, IndexerError> {
        let result = self.sync_pending().await;
        match &result {
            Ok(CycleOutcome::Synced(report)) => {
                tracing::info!(
                    from = report.resume_block,
                    to = report.head_block,
                    chunks = report.chunks.len(),
                    events = report.events_stored,
                    "Sync cycle complete"
                );
                self.set_phase(SyncPhase::Idle);
            }
            Ok(_) => self.set_phase(SyncPhase::Idle),
            Err(e) => {
                tracing::error!(error = %e, phase = %self.phase(), "Sync cycle failed");
                self.set_phase(SyncPhase::Failed);
            }
        }
        result
    }

    async fn sync_pending(&self) -> Result<CycleOutcome, IndexerError> {
        let started_at = Utc::now();
        self.set_phase(SyncPhase::Planning);

        let resume = self.cursor.resume_point().await?;
        let head = self.fetcher.current_height().await?;

        if resume > head {
            tracing::debug!(resume, head, "Store is up to date");
            return Ok(CycleOutcome::UpToDate {
                resume_block: resume,
                head_block: head,
            });
        }

        let chunks = plan_ranges(resume, head, self.config.chunk_size);
        tracing::info!(from = resume, to = head, chunks = chunks.len(), "Fetching fee events");

        let delay = self.config.chunk_delay();
        let mut events_stored = 0;
        for (i, range) in chunks.iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            events_stored += self.sync_chunk(*range).await?;
        }

        Ok(CycleOutcome::Synced(CycleReport {
            started_at,
            resume_block: resume,
            head_block: head,
            chunks,
            events_stored,
        }))
    }

    async fn sync_chunk(&self, range: BlockRange) -> Result<usize, IndexerError> {
        self.set_phase(SyncPhase::FetchingChunk);
        let raws = self.fetcher.fetch_logs(range.from, range.to).await?;

        self.set_phase(SyncPhase::Normalizing);
        let events = normalize_all(&raws)?;

        self.set_phase(SyncPhase::Persisting);
        for event in &events {
            self.store.upsert(event).await?;
            tracing::debug!(
                tx = %event.transaction_hash,
                block = event.block_number,
                "Fee event stored"
            );
        }

        tracing::info!(%range, events = events.len(), "Chunk complete");
        Ok(events.len())
    }
}
