use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use hallpass_auth::{Claims, verify_token};
use hallpass_core::AppError;
use hallpass_models::{UserId, UserRole};

use crate::middleware::scope::Actor;
use crate::state::AppState;

/// Extractor that validates the bearer token and exposes its claims.
///
/// Use [`Actor`] instead when the handler needs the caller's department,
/// hostel or active flag.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> Result<UserId, AppError> {
        self.0.user_id()
    }

    pub fn role(&self) -> UserRole {
        self.0.role
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?;

        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}

/// Loads the caller's current profile. Unknown or deactivated accounts are
/// rejected with 401 even when the token itself is still valid.
impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(actor) = parts.extensions.get::<Actor>() {
            return Ok(actor.clone());
        }

        let auth_user = AuthUser::from_request_parts(parts, state).await?;
        let user_id = auth_user.user_id()?;

        let user = state
            .store
            .find_user(user_id)
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(|| AppError::unauthorized("User account not found or inactive"))?;

        let actor = Actor::from(user);
        parts.extensions.insert(actor.clone());
        Ok(actor)
    }
}
