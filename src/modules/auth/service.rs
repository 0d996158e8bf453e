use chrono::Utc;
use hallpass_auth::create_access_token;
use hallpass_config::JwtConfig;
use hallpass_core::{AppError, hash_password, verify_password};
use hallpass_db::CampusStore;
use hallpass_db::store::EMAIL_TAKEN_MESSAGE;
use hallpass_models::{NewUser, UserResponse};
use tracing::{info, instrument, warn};

use super::model::{LoginRequest, LoginResponse, RegisterRequest};
use crate::metrics::{
    track_jwt_issued, track_user_login_failure, track_user_login_success, track_user_registered,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub struct AuthService;

impl AuthService {
    /// Creates a student, faculty or warden account.
    #[instrument(skip(store, dto), fields(email = %dto.email, role = %dto.role))]
    pub async fn register_user(
        store: &dyn CampusStore,
        dto: RegisterRequest,
    ) -> Result<UserResponse, AppError> {
        if !dto.role.is_self_registrable() {
            return Err(AppError::invalid_field(
                "role",
                "Admin accounts cannot be self-registered",
            ));
        }

        if store.find_user_by_email(&dto.email).await?.is_some() {
            return Err(AppError::conflict(anyhow::anyhow!(EMAIL_TAKEN_MESSAGE)));
        }

        let password_hash = hash_password(&dto.password)?;

        let user = store
            .create_user(NewUser {
                name: dto.name.trim().to_string(),
                email: dto.email,
                password_hash,
                role: dto.role,
                department: dto.department.trim().to_string(),
                hostel: trimmed(dto.hostel),
                phone: trimmed(dto.phone),
                student_number: trimmed(dto.student_number),
            })
            .await?;

        track_user_registered(user.role.as_str());
        info!(user_id = %user.id, "user registered");
        Ok(user.into())
    }

    /// Verifies credentials and issues a bearer token.
    ///
    /// Unknown emails and wrong passwords get the same message.
    #[instrument(skip(store, dto, jwt_config), fields(email = %dto.email))]
    pub async fn login_user(
        store: &dyn CampusStore,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let Some(mut user) = store.find_user_by_email(&dto.email).await? else {
            track_user_login_failure("unknown_email");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        if !verify_password(&dto.password, &user.password_hash)? {
            track_user_login_failure("bad_password");
            warn!(user_id = %user.id, "failed login attempt");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        if !user.is_active {
            track_user_login_failure("inactive");
            return Err(AppError::unauthorized("Account is inactive"));
        }

        let access_token = create_access_token(user.id, &user.email, user.role, jwt_config)?;
        track_jwt_issued();

        let now = Utc::now();
        store.record_login(user.id, now).await?;
        user.last_login = Some(now);

        track_user_login_success(user.role.as_str());
        info!(user_id = %user.id, "user logged in");

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: jwt_config.access_token_expiry,
            user: user.into(),
        })
    }
}
