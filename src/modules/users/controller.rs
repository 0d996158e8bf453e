use axum::{
    Json,
    extract::{Query, State},
};
use hallpass_core::AppError;
use tracing::instrument;

use super::model::{
    ChangePasswordDto, DashboardResponse, PaginatedUsersResponse, UserFilterParams, UserResponse,
};
use super::service::UserService;
use crate::middleware::role::{RequireAdmin, RequireFaculty, RequireWarden};
use crate::middleware::scope::Actor;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::MessageResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Get the current user's profile
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<UserResponse>, AppError> {
    let user = UserService::get_profile(state.store.as_ref(), actor.id).await?;
    Ok(Json(user))
}

#[utoipa::path(
    put,
    path = "/api/users/me/password",
    request_body = ChangePasswordDto,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Current password is incorrect or new password invalid", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn change_password(
    State(state): State<AppState>,
    actor: Actor,
    ValidatedJson(dto): ValidatedJson<ChangePasswordDto>,
) -> Result<Json<MessageResponse>, AppError> {
    UserService::change_password(state.store.as_ref(), actor.id, dto).await?;
    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// List users (admin only)
#[utoipa::path(
    get,
    path = "/api/users",
    params(UserFilterParams),
    responses(
        (status = 200, description = "Users", body = PaginatedUsersResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<UserFilterParams>,
) -> Result<Json<PaginatedUsersResponse>, AppError> {
    let users = UserService::list_users(state.store.as_ref(), &params).await?;
    Ok(Json(users))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/admin",
    responses(
        (status = 200, description = "Admin dashboard", body = DashboardResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboards"
)]
#[instrument(skip(state))]
pub async fn admin_dashboard(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
) -> Result<Json<DashboardResponse>, AppError> {
    Ok(Json(UserService::dashboard(state.store.as_ref(), &actor).await?))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/faculty",
    responses(
        (status = 200, description = "Faculty dashboard", body = DashboardResponse),
        (status = 403, description = "Faculty only", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboards"
)]
#[instrument(skip(state))]
pub async fn faculty_dashboard(
    State(state): State<AppState>,
    RequireFaculty(actor): RequireFaculty,
) -> Result<Json<DashboardResponse>, AppError> {
    Ok(Json(UserService::dashboard(state.store.as_ref(), &actor).await?))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/warden",
    responses(
        (status = 200, description = "Warden dashboard", body = DashboardResponse),
        (status = 403, description = "Warden only", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboards"
)]
#[instrument(skip(state))]
pub async fn warden_dashboard(
    State(state): State<AppState>,
    RequireWarden(actor): RequireWarden,
) -> Result<Json<DashboardResponse>, AppError> {
    Ok(Json(UserService::dashboard(state.store.as_ref(), &actor).await?))
}
