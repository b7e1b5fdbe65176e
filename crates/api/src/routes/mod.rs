//! API route definitions.

use axum::Router;

use crate::AppState;
use caja_core::cashbox::{BoxRepository, ExpenseRepository};
use caja_core::consolidation::{DocumentArchive, SettlementNotifier, SettlementRenderer};

pub mod boxes;
pub mod expenses;
pub mod health;

/// Creates the API router with all routes.
pub fn api_routes<B, E, R, A, N>() -> Router<AppState<B, E, R, A, N>>
where
    B: BoxRepository + 'static,
    E: ExpenseRepository + 'static,
    R: SettlementRenderer + 'static,
    A: DocumentArchive + 'static,
    N: SettlementNotifier + 'static,
{
    Router::new()
        .merge(boxes::routes())
        .merge(expenses::routes())
}

/// JSON error envelope used by every route.
pub(crate) fn error_body(code: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        "error": code,
        "message": message,
    })
}
