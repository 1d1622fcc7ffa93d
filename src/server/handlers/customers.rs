use crate::core::entity::{RecordId, UNASSIGNED};
use crate::core::error::{CrewResult, EntityError};
use crate::core::input::CustomerInput;
use crate::core::model::Customer;
use crate::server::extract::ValidJson;
use crate::server::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

pub async fn list_customers(State(state): State<AppState>) -> CrewResult<Json<Vec<Customer>>> {
    Ok(Json(state.repos.customers.list().await?))
}

pub async fn create_customer(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<CustomerInput>,
) -> CrewResult<(StatusCode, Json<Customer>)> {
    let customer = state
        .repos
        .customers
        .create(input.into_customer(UNASSIGNED))
        .await?;
    tracing::info!(customer_id = customer.id, "Customer created");
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    ValidJson(input): ValidJson<CustomerInput>,
) -> CrewResult<Json<Customer>> {
    let customer = state
        .repos
        .customers
        .update(id, input.into_customer(id))
        .await?
        .ok_or_else(|| EntityError::not_found("customer", id))?;
    Ok(Json(customer))
}

/// Refused with 409 while the customer still has jobs
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> CrewResult<StatusCode> {
    if !state.repos.customers.delete(id).await? {
        return Err(EntityError::not_found("customer", id).into());
    }
    tracing::info!(customer_id = id, "Customer deleted");
    Ok(StatusCode::NO_CONTENT)
}
