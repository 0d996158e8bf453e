use axum::{Json, extract::State, http::StatusCode};
use hallpass_core::AppError;
use hallpass_models::UserResponse;
use serde_json::Value;
use tracing::instrument;
use utoipa::ToSchema;

use super::model::{LoginRequest, LoginResponse, RegisterRequest};
use super::service::AuthService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Error body shared by every endpoint.
#[derive(ToSchema)]
pub struct ErrorResponse {
    /// One of `validation_error`, `unauthorized`, `forbidden`, `not_found`,
    /// `conflict`, `internal_error`
    pub kind: String,
    pub error: String,
    /// Per-field messages or conflict context, when available
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

/// Register a new student, faculty or warden account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Email or student number already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn register_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = AuthService::register_user(state.store.as_ref(), dto).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Login and receive a JWT
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials or inactive account", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AuthService::login_user(state.store.as_ref(), dto, &state.jwt_config).await?;
    Ok(Json(response))
}
