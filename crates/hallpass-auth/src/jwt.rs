//! Token issue and verification (HS256).
//!
//! ```ignore
//! use hallpass_auth::{create_access_token, verify_token};
//! use hallpass_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user.id, &user.email, user.role, &config)?;
//! let claims = verify_token(&token, &config)?;
//! ```

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use hallpass_config::JwtConfig;
use hallpass_core::AppError;
use hallpass_models::{UserId, UserRole};

use crate::claims::Claims;

pub fn create_access_token(
    user_id: UserId,
    email: &str,
    role: UserRole,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.access_token_expiry.max(0) as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role,
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

/// Fails with 401 on a bad signature, an expired token or a malformed payload.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 3600,
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let config = test_config();
        let user_id = UserId::new();

        let token =
            create_access_token(user_id, "s@campus.edu", UserRole::Student, &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.email, "s@campus.edu");
        assert_eq!(claims.role, UserRole::Student);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_garbage_token_is_unauthorized() {
        let err = verify_token("invalid-token", &test_config()).unwrap_err();
        assert_eq!(err.status, 401);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let config = test_config();
        let token =
            create_access_token(UserId::new(), "f@campus.edu", UserRole::Faculty, &config).unwrap();
        let other = JwtConfig {
            secret: "different-secret-key-at-least-32-characters".to_string(),
            access_token_expiry: 3600,
        };
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let config = test_config();
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: UserId::new().to_string(),
            email: "old@campus.edu".to_string(),
            role: UserRole::Admin,
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();
        assert!(verify_token(&token, &config).is_err());
    }
}
