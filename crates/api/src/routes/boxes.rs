//! Box lifecycle and consolidation routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::AppState;
use crate::routes::error_body;
use caja_core::cashbox::{
    BalanceEngine, BoxRepository, BoxState, ExpenseRepository, OpenBoxInput,
};
use caja_core::consolidation::{DocumentArchive, SettlementNotifier, SettlementRenderer};
use caja_shared::BoxId;

/// Creates the box routes.
pub fn routes<B, E, R, A, N>() -> Router<AppState<B, E, R, A, N>>
where
    B: BoxRepository + 'static,
    E: ExpenseRepository + 'static,
    R: SettlementRenderer + 'static,
    A: DocumentArchive + 'static,
    N: SettlementNotifier + 'static,
{
    Router::new()
        .route("/boxes", post(create_box::<B, E, R, A, N>))
        .route("/boxes/current", get(current_box::<B, E, R, A, N>))
        .route(
            "/boxes/{box_id}/consolidate",
            post(consolidate::<B, E, R, A, N>),
        )
        .route(
            "/boxes/{box_id}/expenses",
            get(list_expenses::<B, E, R, A, N>),
        )
}

/// Request body for opening a box.
#[derive(Debug, Deserialize)]
pub struct CreateBoxRequest {
    /// Person accountable for the fund.
    pub custodian: String,
    /// External tax/ID reference of the custodian.
    pub external_id: String,
    /// Free-text purpose of the fund.
    pub concept: String,
    /// Amount to open the fund with.
    pub initial_amount: Decimal,
}

/// POST `/boxes` - Open a new fund period.
async fn create_box<B, E, R, A, N>(
    State(state): State<AppState<B, E, R, A, N>>,
    Json(payload): Json<CreateBoxRequest>,
) -> impl IntoResponse
where
    B: BoxRepository + 'static,
    E: ExpenseRepository + 'static,
    R: SettlementRenderer + 'static,
    A: DocumentArchive + 'static,
    N: SettlementNotifier + 'static,
{
    let input = OpenBoxInput {
        custodian: payload.custodian,
        external_id: payload.external_id,
        concept: payload.concept,
        initial_amount: payload.initial_amount,
    };

    match state.cashboxes.open_box(input).await {
        Ok(cashbox) => {
            info!(box_id = %cashbox.id, custodian = %cashbox.custodian,
                initial_amount = %cashbox.initial_amount, "Box opened");
            (StatusCode::CREATED, Json(json!({ "box": cashbox }))).into_response()
        }
        Err(e) => {
            warn!(error = %e, "Failed to open box");
            status_with(
                e.http_status_code(),
                Json(error_body(e.error_code(), &e.to_string())),
            )
        }
    }
}

/// GET `/boxes/current` - The active box with its balance summary.
async fn current_box<B, E, R, A, N>(
    State(state): State<AppState<B, E, R, A, N>>,
) -> impl IntoResponse
where
    B: BoxRepository + 'static,
    E: ExpenseRepository + 'static,
    R: SettlementRenderer + 'static,
    A: DocumentArchive + 'static,
    N: SettlementNotifier + 'static,
{
    let cashbox = match state.cashboxes.current_box().await {
        Ok(Some(cashbox)) => cashbox,
        Ok(None) => {
            return status_with(
                404,
                Json(error_body("NO_ACTIVE_BOX", "No box is currently open")),
            );
        }
        Err(e) => {
            error!(error = %e, "Failed to load current box");
            return status_with(
                e.http_status_code(),
                Json(error_body(e.error_code(), &e.to_string())),
            );
        }
    };

    let expenses = match state.expenses.list_for_box(cashbox.id).await {
        Ok(expenses) => expenses,
        Err(e) => {
            error!(error = %e, box_id = %cashbox.id, "Failed to load expenses");
            return status_with(
                e.http_status_code(),
                Json(error_body(e.error_code(), &e.to_string())),
            );
        }
    };

    let balance = BalanceEngine::consumption(&cashbox, &expenses);
    let consolidation_due = balance.utilization_percent
        >= state.settings.consolidation_threshold_percent
        || balance.is_deficit();
    // A box stuck in Consolidating (e.g. after a renderer outage) is
    // resumable via the consolidate endpoint, never by reopening it.
    let resumable = cashbox.state == BoxState::Consolidating;

    status_with(
        200,
        Json(json!({
            "box": cashbox,
            "balance": balance,
            "consolidation_due": consolidation_due,
            "resumable": resumable,
        })),
    )
}

/// POST `/boxes/{box_id}/consolidate` - Run or resume consolidation.
async fn consolidate<B, E, R, A, N>(
    State(state): State<AppState<B, E, R, A, N>>,
    Path(box_id): Path<Uuid>,
) -> impl IntoResponse
where
    B: BoxRepository + 'static,
    E: ExpenseRepository + 'static,
    R: SettlementRenderer + 'static,
    A: DocumentArchive + 'static,
    N: SettlementNotifier + 'static,
{
    match state
        .consolidation
        .consolidate(BoxId::from_uuid(box_id))
        .await
    {
        Ok(outcome) => status_with(
            200,
            Json(json!({
                "box": outcome.cashbox,
                "settlement": outcome.settlement,
                "document_ref": outcome.document_ref,
                "already_consolidated": outcome.already_consolidated,
            })),
        ),
        Err(e) => {
            error!(error = %e, box_id = %box_id, retryable = e.is_retryable(),
                "Consolidation failed");
            status_with(
                e.http_status_code(),
                Json(error_body(e.error_code(), &e.to_string())),
            )
        }
    }
}

/// GET `/boxes/{box_id}/expenses` - All expenses recorded against a box.
async fn list_expenses<B, E, R, A, N>(
    State(state): State<AppState<B, E, R, A, N>>,
    Path(box_id): Path<Uuid>,
) -> impl IntoResponse
where
    B: BoxRepository + 'static,
    E: ExpenseRepository + 'static,
    R: SettlementRenderer + 'static,
    A: DocumentArchive + 'static,
    N: SettlementNotifier + 'static,
{
    match state
        .expenses
        .list_for_box(BoxId::from_uuid(box_id))
        .await
    {
        Ok(expenses) => status_with(200, Json(json!({ "expenses": expenses }))),
        Err(e) => {
            error!(error = %e, box_id = %box_id, "Failed to list expenses");
            status_with(
                e.http_status_code(),
                Json(error_body(e.error_code(), &e.to_string())),
            )
        }
    }
}

/// Build a response from a numeric status code and a JSON body.
fn status_with(status: u16, body: Json<serde_json::Value>) -> axum::response::Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, body).into_response()
}
