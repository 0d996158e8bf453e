use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use hallpass_core::AppError;
use tracing::instrument;

use super::model::{
    AttendanceFilterParams, AttendanceRecord, AttendanceStats, DepartmentStatsParams,
    DepartmentStatsResponse, MarkAttendanceDto, StatsParams,
};
use super::service::AttendanceService;
use crate::middleware::role::{RequireFaculty, RequireFacultyOrAdmin};
use crate::middleware::scope::Actor;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Mark a student present or absent for a day
#[utoipa::path(
    post,
    path = "/api/attendance/mark",
    request_body = MarkAttendanceDto,
    responses(
        (status = 201, description = "Attendance recorded", body = AttendanceRecord),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Faculty only", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 409, description = "Already marked, or student on approved leave", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(state, dto))]
pub async fn mark_attendance(
    State(state): State<AppState>,
    RequireFaculty(actor): RequireFaculty,
    ValidatedJson(dto): ValidatedJson<MarkAttendanceDto>,
) -> Result<(StatusCode, Json<AttendanceRecord>), AppError> {
    let record = AttendanceService::mark(state.store.as_ref(), &actor, dto).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Attendance records, newest day first
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceFilterParams),
    responses(
        (status = 200, description = "Attendance records", body = Vec<AttendanceRecord>),
        (status = 400, description = "student_id is required", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Student outside the caller's scope", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(state))]
pub async fn list_attendance(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<AttendanceFilterParams>,
) -> Result<Json<Vec<AttendanceRecord>>, AppError> {
    let records = AttendanceService::list(state.store.as_ref(), &actor, &params).await?;
    Ok(Json(records))
}

#[utoipa::path(
    get,
    path = "/api/attendance/stats",
    params(StatsParams),
    responses(
        (status = 200, description = "Attendance statistics", body = AttendanceStats),
        (status = 400, description = "student_id is required", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Student outside the caller's scope", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(state))]
pub async fn attendance_stats(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<StatsParams>,
) -> Result<Json<AttendanceStats>, AppError> {
    let stats = AttendanceService::stats(state.store.as_ref(), &actor, params.student_id).await?;
    Ok(Json(stats))
}

/// Per-student attendance for a department
///
/// Faculty always get their own department; admins must name one.
#[utoipa::path(
    get,
    path = "/api/attendance/department",
    params(DepartmentStatsParams),
    responses(
        (status = 200, description = "Department statistics", body = DepartmentStatsResponse),
        (status = 400, description = "department is required for admins", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Faculty and admins only", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(state))]
pub async fn department_stats(
    State(state): State<AppState>,
    RequireFacultyOrAdmin(actor): RequireFacultyOrAdmin,
    Query(params): Query<DepartmentStatsParams>,
) -> Result<Json<DepartmentStatsResponse>, AppError> {
    let stats =
        AttendanceService::department_stats(state.store.as_ref(), &actor, params.department)
            .await?;
    Ok(Json(stats))
}
