//! User directory models.
//!
//! A user has exactly one [`UserRole`], fixed at creation. Department and
//! hostel are the attributes the scope rules key on: faculty act within a
//! department, wardens within a hostel.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use hallpass_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Student,
    Faculty,
    Warden,
}

impl UserRole {
    pub const ALL: [UserRole; 4] = [Self::Admin, Self::Student, Self::Faculty, Self::Warden];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Student => "student",
            Self::Faculty => "faculty",
            Self::Warden => "warden",
        }
    }

    /// Roles that may be chosen through public registration.
    pub fn is_self_registrable(&self) -> bool {
        match self {
            Self::Admin => false,
            Self::Student | Self::Faculty | Self::Warden => true,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "student" => Ok(Self::Student),
            "faculty" => Ok(Self::Faculty),
            "warden" => Ok(Self::Warden),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// A stored user. Carries the password digest, so it is never serialized;
/// responses go through [`UserResponse`].
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub department: String,
    pub hostel: Option<String>,
    pub phone: Option<String>,
    pub student_number: Option<String>,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to insert a user. The digest is computed by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub department: String,
    pub hostel: Option<String>,
    pub phone: Option<String>,
    pub student_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub department: String,
    pub hostel: Option<String>,
    pub phone: Option<String>,
    pub student_number: Option<String>,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            department: user.department,
            hostel: user.hostel,
            phone: user.phone,
            student_number: user.student_number,
            is_active: user.is_active,
            last_login: user.last_login,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserFilterParams {
    pub role: Option<UserRole>,
    pub department: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedUsersResponse {
    pub data: Vec<UserResponse>,
    pub meta: PaginationMeta,
}

/// The current password is re-checked before the digest is replaced.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordDto {
    #[validate(length(min = 1, message = "Current password is required"))]
    #[serde(alias = "old_password")]
    pub current_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[schema(example = "newPassword123")]
    pub new_password: String,
}

/// Landing payload for the role dashboards.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    pub message: String,
    pub role: UserRole,
    /// Pending leave requests the caller is able to decide.
    pub pending_leaves: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&UserRole::Warden).unwrap(), r#""warden""#);
        let role: UserRole = serde_json::from_str(r#""faculty""#).unwrap();
        assert_eq!(role, UserRole::Faculty);
        assert!(serde_json::from_str::<UserRole>(r#""teacher""#).is_err());
    }

    #[test]
    fn test_role_from_str_round_trips_display() {
        for role in UserRole::ALL {
            assert_eq!(role.to_string().parse::<UserRole>(), Ok(role));
        }
    }

    #[test]
    fn test_admin_cannot_self_register() {
        assert!(!UserRole::Admin.is_self_registrable());
        assert!(UserRole::Student.is_self_registrable());
        assert!(UserRole::Warden.is_self_registrable());
    }

    #[test]
    fn test_change_password_validation() {
        let ok = ChangePasswordDto {
            current_password: "oldpass".into(),
            new_password: "newpass".into(),
        };
        assert!(ok.validate().is_ok());

        let short = ChangePasswordDto {
            current_password: "oldpass".into(),
            new_password: "abc".into(),
        };
        assert!(short.validate().is_err());
    }

    #[test]
    fn test_filter_params_from_query_shape() {
        let params: UserFilterParams =
            serde_json::from_str(r#"{"role":"student","limit":"5"}"#).unwrap();
        assert_eq!(params.role, Some(UserRole::Student));
        assert_eq!(params.pagination.limit(), 5);
    }
}
