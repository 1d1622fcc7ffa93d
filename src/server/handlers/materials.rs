//! Single-row material edits
//!
//! Bulk replacement of a job's materials lives in [`super::jobs`].

use super::{require, require_reference};
use crate::core::entity::{Entity, RecordId, UNASSIGNED};
use crate::core::error::{CrewResult, EntityError, ValidationError};
use crate::core::model::{Job, Material};
use crate::server::extract::ValidJson;
use crate::server::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

pub async fn create_material(
    State(state): State<AppState>,
    ValidJson(mut material): ValidJson<Material>,
) -> CrewResult<(StatusCode, Json<Material>)> {
    require_reference::<Job, _>(state.repos.jobs.as_ref(), material.job_id, "jobId").await?;
    material.set_id(UNASSIGNED);
    let material = state.repos.material_rows.create(material).await?;
    tracing::info!(material_id = material.id, job_id = material.job_id, "Material created");
    Ok((StatusCode::CREATED, Json(material)))
}

/// A body id, when given, must match the route
pub async fn update_material(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    ValidJson(material): ValidJson<Material>,
) -> CrewResult<Json<Material>> {
    if material.id != UNASSIGNED && material.id != id {
        return Err(ValidationError::field("id", "must match the route id").into());
    }
    require::<Material, _>(state.repos.material_rows.as_ref(), id).await?;
    require_reference::<Job, _>(state.repos.jobs.as_ref(), material.job_id, "jobId").await?;

    let material = state
        .repos
        .material_rows
        .update(id, material)
        .await?
        .ok_or_else(|| EntityError::not_found("material", id))?;
    Ok(Json(material))
}

pub async fn delete_material(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> CrewResult<StatusCode> {
    if !state.repos.material_rows.delete(id).await? {
        return Err(EntityError::not_found("material", id).into());
    }
    tracing::info!(material_id = id, "Material deleted");
    Ok(StatusCode::NO_CONTENT)
}
