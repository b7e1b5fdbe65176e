//! HTTP API layer with Axum routes.
//!
//! This crate exposes the upstream surface of the petty-cash core:
//! - `POST /api/v1/boxes` - open a fund period
//! - `GET  /api/v1/boxes/current` - the active box with its balance summary
//! - `POST /api/v1/boxes/{id}/consolidate` - run or resume consolidation
//! - `GET  /api/v1/boxes/{id}/expenses` - list a box's expenses
//! - `POST /api/v1/expenses` - register an expense
//! - `GET  /health`

pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use caja_core::cashbox::{BoxRepository, CashboxService, ExpenseRepository};
use caja_core::consolidation::{
    ConsolidationService, DocumentArchive, SettlementNotifier, SettlementRenderer,
};
use caja_core::expense::ExpenseService;
use caja_shared::PettyCashSettings;

/// Application state shared across handlers.
///
/// Generic over the collaborator implementations so the same routes serve
/// the HTTP record store in production and the in-memory store in tests.
pub struct AppState<B, E, R, A, N>
where
    B: BoxRepository + 'static,
    E: ExpenseRepository + 'static,
    R: SettlementRenderer + 'static,
    A: DocumentArchive + 'static,
    N: SettlementNotifier + 'static,
{
    /// Box lifecycle service.
    pub cashboxes: Arc<CashboxService<B>>,
    /// Expense registration service.
    pub expenses: Arc<ExpenseService<B, E>>,
    /// Consolidation orchestrator.
    pub consolidation: Arc<ConsolidationService<B, E, R, A, N>>,
    /// Petty-cash policy settings.
    pub settings: Arc<PettyCashSettings>,
}

impl<B, E, R, A, N> Clone for AppState<B, E, R, A, N>
where
    B: BoxRepository + 'static,
    E: ExpenseRepository + 'static,
    R: SettlementRenderer + 'static,
    A: DocumentArchive + 'static,
    N: SettlementNotifier + 'static,
{
    fn clone(&self) -> Self {
        Self {
            cashboxes: Arc::clone(&self.cashboxes),
            expenses: Arc::clone(&self.expenses),
            consolidation: Arc::clone(&self.consolidation),
            settings: Arc::clone(&self.settings),
        }
    }
}

/// Creates the main application router.
pub fn create_router<B, E, R, A, N>(state: AppState<B, E, R, A, N>) -> Router
where
    B: BoxRepository + 'static,
    E: ExpenseRepository + 'static,
    R: SettlementRenderer + 'static,
    A: DocumentArchive + 'static,
    N: SettlementNotifier + 'static,
{
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .merge(routes::health::routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
