//! feeindex-api — read-only HTTP endpoint over the fee event store.
//!
//! ```text
//! GET /api/events/{integrator}   → 200 [CanonicalFeeEvent, …]
//! GET /events/{integrator}       (alias)
//! ```
//!
//! Lookup is case-insensitive on the integrator address and returns the
//! newest block first. Store failures answer `500 {"error":"Failed to fetch events"}`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use feeindex_core::store::FeeEventStore;

/// Errors from running the HTTP server.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Build the endpoint router over `store`.
pub fn router(store: Arc<dyn FeeEventStore>) -> Router {
    Router::new()
        .route("/api/events/:integrator", get(events_by_integrator))
        .route("/events/:integrator", get(events_by_integrator))
        .with_state(store)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// HTTP server for the read endpoint.
pub struct ApiServer {
    addr: SocketAddr,
    store: Arc<dyn FeeEventStore>,
}

impl ApiServer {
    /// Server listening on all interfaces at `port`.
    pub fn new(port: u16, store: Arc<dyn FeeEventStore>) -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], port)),
            store,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve until the listener fails.
    pub async fn run(self) -> Result<(), ApiError> {
        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|source| ApiError::Bind { addr: self.addr, source })?;

        info!(address = %self.addr, "Fee events API listening");
        axum::serve(listener, router(self.store)).await?;
        Ok(())
    }
}

async fn events_by_integrator(
    State(store): State<Arc<dyn FeeEventStore>>,
    Path(integrator): Path<String>,
) -> Response {
    match store.events_by_integrator(&integrator).await {
        Ok(events) => Json(events).into_response(),
        Err(e) => {
            error!(%integrator, error = %e, "Failed to fetch events");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch events" })),
            )
                .into_response()
        }
    }
}
