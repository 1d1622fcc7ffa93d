//! Shared expense ledger
//!
//! `DELETE /{id}` is the reversible soft delete; `DELETE /{id}/permanent`
//! removes the row in either state.

use crate::core::entity::RecordId;
use crate::core::error::CrewResult;
use crate::core::input::ExpenseInput;
use crate::core::model::Expense;
use crate::server::extract::ValidJson;
use crate::server::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

pub async fn list_expenses(State(state): State<AppState>) -> CrewResult<Json<Vec<Expense>>> {
    Ok(Json(state.ledger.list_active().await?))
}

pub async fn list_deleted_expenses(State(state): State<AppState>) -> CrewResult<Json<Vec<Expense>>> {
    Ok(Json(state.ledger.list_deleted().await?))
}

pub async fn create_expense(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<ExpenseInput>,
) -> CrewResult<(StatusCode, Json<Expense>)> {
    Ok((StatusCode::CREATED, Json(state.ledger.create(input).await?)))
}

pub async fn get_expense(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> CrewResult<Json<Expense>> {
    Ok(Json(state.ledger.get_active(id).await?))
}

pub async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    ValidJson(input): ValidJson<ExpenseInput>,
) -> CrewResult<Json<Expense>> {
    Ok(Json(state.ledger.update(id, input).await?))
}

pub async fn toggle_expense_status(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> CrewResult<Json<Expense>> {
    Ok(Json(state.ledger.toggle_status(id).await?))
}

pub async fn soft_delete_expense(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> CrewResult<StatusCode> {
    state.ledger.soft_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn restore_expense(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> CrewResult<Json<Expense>> {
    Ok(Json(state.ledger.restore(id).await?))
}

pub async fn permanently_delete_expense(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> CrewResult<StatusCode> {
    state.ledger.permanent_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
