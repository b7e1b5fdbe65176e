//! Expense registration routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::AppState;
use crate::routes::error_body;
use caja_core::cashbox::{BoxRepository, ExpenseRepository, NewExpenseInput};
use caja_core::consolidation::{DocumentArchive, SettlementNotifier, SettlementRenderer};

/// Creates the expense routes.
pub fn routes<B, E, R, A, N>() -> Router<AppState<B, E, R, A, N>>
where
    B: BoxRepository + 'static,
    E: ExpenseRepository + 'static,
    R: SettlementRenderer + 'static,
    A: DocumentArchive + 'static,
    N: SettlementNotifier + 'static,
{
    Router::new().route("/expenses", post(register_expense::<B, E, R, A, N>))
}

/// Request body for registering an expense.
#[derive(Debug, Deserialize)]
pub struct RegisterExpenseRequest {
    /// Date of the disbursement.
    pub date: NaiveDate,
    /// Who was paid.
    pub payee: String,
    /// External tax/ID reference of the payee.
    pub external_id: String,
    /// Free-text purpose of the expense.
    pub concept: String,
    /// Optional cost center allocation.
    #[serde(default)]
    pub cost_center: Option<String>,
    /// Disbursed amount.
    pub amount: Decimal,
    /// Optional pointer to a receipt document.
    #[serde(default)]
    pub voucher_ref: Option<String>,
}

/// POST `/expenses` - Register an expense against the open box.
async fn register_expense<B, E, R, A, N>(
    State(state): State<AppState<B, E, R, A, N>>,
    Json(payload): Json<RegisterExpenseRequest>,
) -> impl IntoResponse
where
    B: BoxRepository + 'static,
    E: ExpenseRepository + 'static,
    R: SettlementRenderer + 'static,
    A: DocumentArchive + 'static,
    N: SettlementNotifier + 'static,
{
    let input = NewExpenseInput {
        date: payload.date,
        payee: payload.payee,
        external_id: payload.external_id,
        concept: payload.concept,
        cost_center: payload.cost_center,
        amount: payload.amount,
        voucher_ref: payload.voucher_ref,
    };

    match state.expenses.register(input).await {
        Ok(expense) => {
            info!(expense_id = %expense.id, box_id = %expense.box_id,
                amount = %expense.amount, "Expense registered");
            (StatusCode::CREATED, Json(json!({ "expense": expense }))).into_response()
        }
        Err(e) => {
            warn!(error = %e, retryable = e.is_retryable(), "Expense rejected");
            let status = StatusCode::from_u16(e.http_status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(error_body(e.error_code(), &e.to_string()))).into_response()
        }
    }
}
