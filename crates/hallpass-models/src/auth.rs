//! Registration and login DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::users::{UserResponse, UserRole};

/// Public sign-up. Admin accounts are created through the CLI only.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_registration", skip_on_field_errors = false))]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    #[schema(example = "Asha Verma")]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "asha@campus.edu")]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[schema(example = "password123")]
    pub password: String,
    pub role: UserRole,
    #[validate(length(min = 1, max = 100, message = "Department is required"))]
    #[schema(example = "CS")]
    pub department: String,
    #[validate(length(min = 1, max = 100, message = "Hostel must not be empty"))]
    pub hostel: Option<String>,
    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Student number must not be empty"))]
    pub student_number: Option<String>,
}

fn validate_registration(req: &RegisterRequest) -> Result<(), ValidationError> {
    if !req.role.is_self_registrable() {
        let err = ValidationError::new("role");
        return Err(err.with_message("Admin accounts cannot be self-registered".into()));
    }
    if req.role == UserRole::Warden && req.hostel.as_deref().is_none_or(|h| h.trim().is_empty()) {
        let err = ValidationError::new("hostel");
        return Err(err.with_message("Wardens must be assigned a hostel".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "password123")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(role: UserRole, hostel: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            name: "Asha Verma".into(),
            email: "asha@campus.edu".into(),
            password: "secret1".into(),
            role,
            department: "CS".into(),
            hostel: hostel.map(str::to_string),
            phone: None,
            student_number: None,
        }
    }

    #[test]
    fn test_student_registration_is_valid() {
        assert!(request(UserRole::Student, None).validate().is_ok());
    }

    #[test]
    fn test_admin_registration_is_rejected() {
        let errors = request(UserRole::Admin, None).validate().unwrap_err();
        assert!(errors.errors().contains_key("__all__"));
    }

    #[test]
    fn test_warden_requires_hostel() {
        assert!(request(UserRole::Warden, None).validate().is_err());
        assert!(request(UserRole::Warden, Some("H1")).validate().is_ok());
    }

    #[test]
    fn test_field_rules() {
        let mut req = request(UserRole::Faculty, None);
        req.name = "A".into();
        req.email = "not-an-email".into();
        req.password = "123".into();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_login_request_validation() {
        let ok = LoginRequest {
            email: "a@b.edu".into(),
            password: "x".into(),
        };
        assert!(ok.validate().is_ok());
        let empty = LoginRequest {
            email: "a@b.edu".into(),
            password: String::new(),
        };
        assert!(empty.validate().is_err());
    }
}
