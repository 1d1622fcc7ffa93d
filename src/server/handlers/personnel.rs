use super::require_reference;
use crate::core::entity::{RecordId, UNASSIGNED};
use crate::core::error::{CrewResult, EntityError};
use crate::core::input::{PaymentInput, PersonnelInput};
use crate::core::model::{Job, Personnel, PersonnelPayment};
use crate::server::extract::ValidJson;
use crate::server::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

pub async fn list_personnel(State(state): State<AppState>) -> CrewResult<Json<Vec<Personnel>>> {
    Ok(Json(state.repos.personnel.list().await?))
}

pub async fn create_personnel(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<PersonnelInput>,
) -> CrewResult<(StatusCode, Json<Personnel>)> {
    let personnel = state
        .repos
        .personnel
        .create(input.into_personnel(UNASSIGNED, state.normalizer.now()))
        .await?;
    tracing::info!(personnel_id = personnel.id, "Personnel created");
    Ok((StatusCode::CREATED, Json(personnel)))
}

pub async fn update_personnel(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    ValidJson(input): ValidJson<PersonnelInput>,
) -> CrewResult<Json<Personnel>> {
    let personnel = state
        .repos
        .personnel
        .update(id, input.into_personnel(id, state.normalizer.now()))
        .await?
        .ok_or_else(|| EntityError::not_found("personnel", id))?;
    Ok(Json(personnel))
}

pub async fn delete_personnel(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> CrewResult<StatusCode> {
    if !state.repos.personnel.delete(id).await? {
        return Err(EntityError::not_found("personnel", id).into());
    }
    tracing::info!(personnel_id = id, "Personnel deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Payments are always dated by the server
pub async fn create_payment(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<PaymentInput>,
) -> CrewResult<(StatusCode, Json<PersonnelPayment>)> {
    require_reference::<Personnel, _>(state.repos.personnel.as_ref(), input.personnel_id, "personnelId").await?;
    if let Some(job_id) = input.job_id {
        require_reference::<Job, _>(state.repos.jobs.as_ref(), job_id, "jobId").await?;
    }

    let payment = state
        .repos
        .payments
        .create(input.into_payment(state.normalizer.now()))
        .await?;
    tracing::info!(
        payment_id = payment.id,
        personnel_id = payment.personnel_id,
        amount = %payment.amount,
        "Personnel payment recorded"
    );
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn delete_payment(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> CrewResult<StatusCode> {
    if !state.repos.payments.delete(id).await? {
        return Err(EntityError::not_found("personnel payment", id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
