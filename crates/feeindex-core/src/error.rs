//! Error types for the fee sync pipeline.

use thiserror::Error;

/// Errors that can occur while synchronizing or serving fee events.
///
/// Every variant is fatal to the sync cycle that raised it. The caller decides
/// whether the process survives; the library never retries.
#[derive(Debug, Error)]
pub enum IndexerError {
    /// RPC height or log query failure (network, rate limit, node down).
    #[error("RPC provider error: {0}")]
    Provider(String),

    /// A raw log is missing a required field or has the wrong shape.
    #[error("Malformed event{}: {reason}", tx_suffix(.tx_hash))]
    MalformedEvent {
        tx_hash: Option<String>,
        reason: String,
    },

    /// Persistence failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid static configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A sync task ended without producing a result (panic or cancellation).
    #[error("Sync aborted: {reason}")]
    Aborted { reason: String },
}

fn tx_suffix(tx_hash: &Option<String>) -> String {
    match tx_hash {
        Some(hash) => format!(" in tx {hash}"),
        None => String::new(),
    }
}

impl IndexerError {
    pub fn malformed(tx_hash: Option<&str>, reason: impl Into<String>) -> Self {
        Self::MalformedEvent {
            tx_hash: tx_hash.map(str::to_string),
            reason: reason.into(),
        }
    }

    /// Returns `true` if the error came from the RPC provider.
    pub fn is_provider(&self) -> bool {
        matches!(self, Self::Provider(_))
    }

    /// Returns `true` if the error was raised by event normalization.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedEvent { .. })
    }

    /// Returns `true` if the error came from the store.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}
