//! Health check endpoints.

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::AppState;
use caja_core::cashbox::{BoxRepository, ExpenseRepository};
use caja_core::consolidation::{DocumentArchive, SettlementNotifier, SettlementRenderer};

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Health check handler.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Creates health check routes.
pub fn routes<B, E, R, A, N>() -> Router<AppState<B, E, R, A, N>>
where
    B: BoxRepository + 'static,
    E: ExpenseRepository + 'static,
    R: SettlementRenderer + 'static,
    A: DocumentArchive + 'static,
    N: SettlementNotifier + 'static,
{
    Router::new().route("/health", get(health_check))
}
