//! Role-based authorization for Axum.
//!
//! Two ways to gate a handler on the caller's role:
//! 1. Extractors such as [`RequireStudent`] that resolve to the [`Actor`]
//! 2. Layer-based middleware using [`require_roles`] / [`require_admin`]
//!
//! Record-level checks (department, hostel, ownership) live in
//! [`crate::middleware::scope`].

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use hallpass_core::AppError;
use hallpass_models::UserRole;

use crate::middleware::scope::Actor;
use crate::state::AppState;

/// Fails with 403 unless `actor` holds one of `allowed`.
pub fn check_any_role(actor: &Actor, allowed: &[UserRole]) -> Result<(), AppError> {
    if allowed.contains(&actor.role) {
        return Ok(());
    }

    let names = allowed
        .iter()
        .map(UserRole::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    Err(AppError::forbidden(format!(
        "Access denied. Required role: {}, but user has role: {}",
        names, actor.role
    )))
}

pub fn check_role(actor: &Actor, required: UserRole) -> Result<(), AppError> {
    check_any_role(actor, &[required])
}

/// Middleware that loads the [`Actor`] and checks it against `allowed_roles`.
///
/// The actor is cached in the request extensions, so handlers extracting it
/// again do not hit the store twice.
///
/// ```rust,ignore
/// let admin_routes = Router::new()
///     .route("/", get(list_users))
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));
/// ```
pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed_roles: &[UserRole],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let actor = Actor::from_request_parts(&mut parts, &state).await?;
    check_any_role(&actor, allowed_roles)?;

    Ok(next.run(Request::from_parts(parts, body)).await)
}

pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(State(state), req, next, &[UserRole::Admin]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Declares an extractor that resolves to the [`Actor`] when their role is allowed.
macro_rules! require_role {
    ($(#[$meta:meta])* $name:ident, [$($role:expr),+ $(,)?]) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(pub Actor);

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let actor = Actor::from_request_parts(parts, state).await?;
                check_any_role(&actor, &[$($role),+])?;
                Ok($name(actor))
            }
        }
    };
}

require_role!(
    /// Admin only.
    RequireAdmin,
    [UserRole::Admin]
);
require_role!(
    /// Student only; used for filing leave.
    RequireStudent,
    [UserRole::Student]
);
require_role!(
    /// Faculty only; used for marking attendance.
    RequireFaculty,
    [UserRole::Faculty]
);
require_role!(RequireWarden, [UserRole::Warden]);
require_role!(
    /// Roles that may approve or reject leave, subject to scope.
    RequireApprover,
    [UserRole::Faculty, UserRole::Warden, UserRole::Admin]
);
require_role!(RequireFacultyOrAdmin, [UserRole::Faculty, UserRole::Admin]);
