use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use hallpass_core::AppError;
use hallpass_models::LeaveId;
use tracing::instrument;

use super::model::{
    ApplyLeaveDto, DecideLeaveDto, LeaveDecision, LeaveFilterParams, LeaveRequest,
    PaginatedLeavesResponse,
};
use super::service::LeaveService;
use crate::middleware::role::{RequireApprover, RequireStudent};
use crate::middleware::scope::Actor;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Submit a leave request
#[utoipa::path(
    post,
    path = "/api/leaves/apply",
    request_body = ApplyLeaveDto,
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveRequest),
        (status = 400, description = "Invalid dates or field values", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Only students can apply", body = ErrorResponse),
        (status = 409, description = "Overlaps an existing request", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Leaves"
)]
#[instrument(skip(state, dto))]
pub async fn apply_leave(
    State(state): State<AppState>,
    RequireStudent(actor): RequireStudent,
    ValidatedJson(dto): ValidatedJson<ApplyLeaveDto>,
) -> Result<(StatusCode, Json<LeaveRequest>), AppError> {
    let today = Utc::now().date_naive();
    let leave = LeaveService::submit(state.store.as_ref(), &actor, dto, today).await?;
    Ok((StatusCode::CREATED, Json(leave)))
}

/// List leave requests visible to the caller
///
/// Students see their own requests, faculty their department, wardens their
/// hostel and admins everything. Faculty and wardens get pending requests
/// unless a status is given.
#[utoipa::path(
    get,
    path = "/api/leaves",
    params(LeaveFilterParams),
    responses(
        (status = 200, description = "Leave requests", body = PaginatedLeavesResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Warden without a hostel", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Leaves"
)]
#[instrument(skip(state))]
pub async fn list_leaves(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<LeaveFilterParams>,
) -> Result<Json<PaginatedLeavesResponse>, AppError> {
    let page = LeaveService::list(state.store.as_ref(), &actor, &params).await?;
    Ok(Json(page))
}

/// List the caller's own leave requests
#[utoipa::path(
    get,
    path = "/api/leaves/my",
    params(LeaveFilterParams),
    responses(
        (status = 200, description = "Own leave requests", body = PaginatedLeavesResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Leaves"
)]
#[instrument(skip(state))]
pub async fn list_my_leaves(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<LeaveFilterParams>,
) -> Result<Json<PaginatedLeavesResponse>, AppError> {
    let page = LeaveService::list_own(state.store.as_ref(), &actor, &params).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/leaves/{id}",
    params(("id" = String, Path, description = "Leave request ID")),
    responses(
        (status = 200, description = "Leave request", body = LeaveRequest),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Outside the caller's scope", body = ErrorResponse),
        (status = 404, description = "Leave request not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Leaves"
)]
#[instrument(skip(state))]
pub async fn get_leave(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<LeaveId>,
) -> Result<Json<LeaveRequest>, AppError> {
    let leave = LeaveService::get(state.store.as_ref(), &actor, id).await?;
    Ok(Json(leave))
}

async fn decide(
    state: AppState,
    actor: Actor,
    id: LeaveId,
    decision: LeaveDecision,
    dto: DecideLeaveDto,
) -> Result<Json<LeaveRequest>, AppError> {
    let leave = LeaveService::decide(
        state.store.as_ref(),
        &state.notifications,
        &actor,
        id,
        decision,
        dto,
    )
    .await?;
    Ok(Json(leave))
}

/// Approve a pending leave request
#[utoipa::path(
    put,
    path = "/api/leaves/{id}/approve",
    params(("id" = String, Path, description = "Leave request ID")),
    request_body = DecideLeaveDto,
    responses(
        (status = 200, description = "Leave request approved", body = LeaveRequest),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not allowed to decide this request", body = ErrorResponse),
        (status = 404, description = "Leave request not found", body = ErrorResponse),
        (status = 409, description = "Already processed", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Leaves"
)]
#[instrument(skip(state, dto))]
pub async fn approve_leave(
    State(state): State<AppState>,
    RequireApprover(actor): RequireApprover,
    Path(id): Path<LeaveId>,
    ValidatedJson(dto): ValidatedJson<DecideLeaveDto>,
) -> Result<Json<LeaveRequest>, AppError> {
    decide(state, actor, id, LeaveDecision::Approve, dto).await
}

/// Reject a pending leave request
#[utoipa::path(
    put,
    path = "/api/leaves/{id}/reject",
    params(("id" = String, Path, description = "Leave request ID")),
    request_body = DecideLeaveDto,
    responses(
        (status = 200, description = "Leave request rejected", body = LeaveRequest),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not allowed to decide this request", body = ErrorResponse),
        (status = 404, description = "Leave request not found", body = ErrorResponse),
        (status = 409, description = "Already processed", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Leaves"
)]
#[instrument(skip(state, dto))]
pub async fn reject_leave(
    State(state): State<AppState>,
    RequireApprover(actor): RequireApprover,
    Path(id): Path<LeaveId>,
    ValidatedJson(dto): ValidatedJson<DecideLeaveDto>,
) -> Result<Json<LeaveRequest>, AppError> {
    decide(state, actor, id, LeaveDecision::Reject, dto).await
}
