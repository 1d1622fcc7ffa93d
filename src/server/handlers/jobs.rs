use super::{require, require_reference};
use crate::core::entity::{RecordId, UNASSIGNED};
use crate::core::error::{CrewResult, EntityError};
use crate::core::input::JobInput;
use crate::core::model::{Customer, Earning, Job, JobDetail, Material};
use crate::server::extract::{JsonBody, ValidJson};
use crate::server::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

pub async fn list_jobs(State(state): State<AppState>) -> CrewResult<Json<Vec<Job>>> {
    Ok(Json(state.repos.jobs.list().await?))
}

/// A job with its earnings and materials
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> CrewResult<Json<JobDetail>> {
    let job = require::<Job, _>(state.repos.jobs.as_ref(), id).await?;
    let earnings = state.repos.earnings.children_of(id).await?;
    let materials = state.repos.materials.children_of(id).await?;
    Ok(Json(JobDetail {
        job,
        earnings,
        materials,
    }))
}

pub async fn create_job(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<JobInput>,
) -> CrewResult<(StatusCode, Json<Job>)> {
    require_reference::<Customer, _>(state.repos.customers.as_ref(), input.customer_id, "customerId").await?;
    let job = input.into_job(UNASSIGNED, &state.normalizer)?;
    let job = state.repos.jobs.create(job).await?;
    tracing::info!(job_id = job.id, customer_id = job.customer_id, "Job created");
    Ok((StatusCode::CREATED, Json(job)))
}

/// A missing date keeps the stored one
pub async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    ValidJson(input): ValidJson<JobInput>,
) -> CrewResult<Json<Job>> {
    let existing = require::<Job, _>(state.repos.jobs.as_ref(), id).await?;
    require_reference::<Customer, _>(state.repos.customers.as_ref(), input.customer_id, "customerId").await?;

    let keep_date = input.date.is_missing();
    let mut job = input.into_job(id, &state.normalizer)?;
    if keep_date {
        job.date = existing.date;
    }

    let job = state
        .repos
        .jobs
        .update(id, job)
        .await?
        .ok_or_else(|| EntityError::not_found("job", id))?;
    Ok(Json(job))
}

/// Earnings and materials go with the job
pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> CrewResult<StatusCode> {
    if !state.repos.jobs.delete(id).await? {
        return Err(EntityError::not_found("job", id).into());
    }
    tracing::info!(job_id = id, "Job deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_earnings(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> CrewResult<Json<Vec<Earning>>> {
    Ok(Json(state.earnings.load_children(id).await?))
}

pub async fn replace_earnings(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    JsonBody(items): JsonBody<Vec<Earning>>,
) -> CrewResult<Json<Vec<Earning>>> {
    Ok(Json(state.earnings.replace_children(id, items).await?))
}

pub async fn list_materials(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> CrewResult<Json<Vec<Material>>> {
    Ok(Json(state.materials.load_children(id).await?))
}

pub async fn replace_materials(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    JsonBody(items): JsonBody<Vec<Material>>,
) -> CrewResult<Json<Vec<Material>>> {
    Ok(Json(state.materials.replace_children(id, items).await?))
}
