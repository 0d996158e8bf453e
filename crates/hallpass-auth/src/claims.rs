//! JWT claim structures for access tokens.

use hallpass_core::AppError;
use hallpass_models::{UserId, UserRole};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Access token claims.
///
/// The token names the caller and their role. Department, hostel and the
/// active flag are not embedded; they are read fresh from the directory on
/// every request so profile changes take effect immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID (subject claim)
    pub sub: String,
    pub email: String,
    pub role: UserRole,
    /// Expiration (Unix timestamp)
    pub exp: usize,
    /// Issued-at (Unix timestamp)
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<UserId, AppError> {
        self.sub
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid token subject"))
    }
}
