use super::{require, require_reference};
use crate::core::aggregation::{AttendanceReport, ReportRequest, default_report_start};
use crate::core::entity::{RecordId, UNASSIGNED};
use crate::core::error::{CrewError, CrewResult, EntityError};
use crate::core::input::AttendanceInput;
use crate::core::model::{Attendance, Job, Personnel};
use crate::core::service::AttendanceQuery;
use crate::server::extract::{QueryParams, ValidJson};
use crate::server::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Records in the range, newest first; the end date is inclusive
pub async fn list_attendance(
    State(state): State<AppState>,
    QueryParams(range): QueryParams<DateRange>,
) -> CrewResult<Json<Vec<Attendance>>> {
    let start = match range.start_date {
        Some(date) => date,
        None => default_report_start()
            .ok_or_else(|| CrewError::Internal("invalid default start date".to_string()))?,
    };
    let end = range
        .end_date
        .unwrap_or_else(|| state.normalizer.now().date_naive());
    let window = state.reports.window(start, end)?;

    let records = state
        .repos
        .attendance
        .query_attendance(&AttendanceQuery {
            from: window.from,
            until: window.until,
            personnel_id: None,
            job_id: None,
        })
        .await?;
    Ok(Json(records))
}

pub async fn get_attendance(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> CrewResult<Json<Attendance>> {
    Ok(Json(require::<Attendance, _>(state.repos.attendance.as_ref(), id).await?))
}

pub async fn create_attendance(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<AttendanceInput>,
) -> CrewResult<(StatusCode, Json<Attendance>)> {
    check_references(&state, &input).await?;
    let record = input.into_attendance(UNASSIGNED, &state.normalizer)?;
    let record = state.repos.attendance.create(record).await?;
    tracing::info!(
        attendance_id = record.id,
        personnel_id = record.personnel_id,
        job_id = record.job_id,
        date = %record.date,
        "Attendance recorded"
    );
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update_attendance(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    ValidJson(input): ValidJson<AttendanceInput>,
) -> CrewResult<Json<Attendance>> {
    require::<Attendance, _>(state.repos.attendance.as_ref(), id).await?;
    check_references(&state, &input).await?;
    let record = input.into_attendance(id, &state.normalizer)?;
    let record = state
        .repos
        .attendance
        .update(id, record)
        .await?
        .ok_or_else(|| EntityError::not_found("attendance", id))?;
    Ok(Json(record))
}

pub async fn delete_attendance(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> CrewResult<StatusCode> {
    if !state.repos.attendance.delete(id).await? {
        return Err(EntityError::not_found("attendance", id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Grouped and totaled attendance; 404 when nothing matches the filter
pub async fn attendance_report(
    State(state): State<AppState>,
    QueryParams(request): QueryParams<ReportRequest>,
) -> CrewResult<Json<AttendanceReport>> {
    Ok(Json(state.reports.generate(request).await?))
}

async fn check_references(state: &AppState, input: &AttendanceInput) -> CrewResult<()> {
    require_reference::<Personnel, _>(state.repos.personnel.as_ref(), input.personnel_id, "personnelId").await?;
    require_reference::<Job, _>(state.repos.jobs.as_ref(), input.job_id, "jobId").await
}
