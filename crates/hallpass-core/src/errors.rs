//! Application error type.
//!
//! Every fallible handler and service returns [`AppError`]. It carries the
//! HTTP status, the underlying [`anyhow::Error`] and optional structured
//! details, and renders as:
//!
//! ```json
//! { "kind": "conflict", "error": "Leave request has already been processed" }
//! ```

use std::collections::BTreeMap;

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use validator::{ValidationErrors, ValidationErrorsKind};

/// Machine-readable error category derived from the status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationError,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    InternalError,
}

impl ErrorKind {
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::BAD_REQUEST => Self::ValidationError,
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::FORBIDDEN => Self::Forbidden,
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::CONFLICT => Self::Conflict,
            _ => Self::InternalError,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "validation_error",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::InternalError => "internal_error",
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
    pub details: Option<Value>,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
            details: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::from_status(self.status)
    }

    /// Attaches a structured payload rendered under `details`.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::internal(anyhow::anyhow!(message.into()))
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn conflict<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::CONFLICT, err)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, anyhow::anyhow!(message.into()))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, anyhow::anyhow!(message.into()))
    }

    /// A single-field validation failure, rendered with per-field details.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::bad_request(anyhow::anyhow!(message.clone()))
            .with_details(json!({ field: [message] }))
    }
}

/// Flattens validator output into `{ field: [messages] }`, nested structs included.
pub fn validation_details(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    let mut out = BTreeMap::new();
    collect_validation_details(errors, None, &mut out);
    out
}

fn collect_validation_details(
    errors: &ValidationErrors,
    prefix: Option<&str>,
    out: &mut BTreeMap<String, Vec<String>>,
) {
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(p) => format!("{p}.{field}"),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = field_errors.iter().map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{field} is invalid"))
                });
                out.entry(path).or_default().extend(messages);
            }
            ValidationErrorsKind::Struct(inner) => {
                collect_validation_details(inner, Some(&path), out);
            }
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect_validation_details(inner, Some(&format!("{path}[{idx}]")), out);
                }
            }
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let details = validation_details(&errors);
        let message = details
            .values()
            .flatten()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        Self::bad_request(anyhow::anyhow!(message)).with_details(json!(details))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let message = if kind == ErrorKind::InternalError {
            tracing::error!(error = ?self.error, "internal error");
            "Internal server error".to_string()
        } else {
            self.error.to_string()
        };

        let mut body = json!({
            "kind": kind.as_str(),
            "error": message,
        });
        if let (Some(details), Some(obj)) = (self.details, body.as_object_mut()) {
            obj.insert("details".to_string(), details);
        }

        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 10, message = "Reason must be at least 10 characters"))]
        reason: String,
        #[validate(length(max = 3))]
        code: String,
    }

    #[test]
    fn test_kind_follows_status() {
        assert_eq!(AppError::conflict(anyhow::anyhow!("x")).kind(), ErrorKind::Conflict);
        assert_eq!(AppError::forbidden("x").kind(), ErrorKind::Forbidden);
        assert_eq!(AppError::unauthorized("x").kind(), ErrorKind::Unauthorized);
        assert_eq!(
            AppError::bad_request(anyhow::anyhow!("x")).kind(),
            ErrorKind::ValidationError
        );
        assert_eq!(AppError::internal_error("x").kind(), ErrorKind::InternalError);
    }

    #[test]
    fn test_validation_errors_become_field_details() {
        let sample = Sample {
            reason: "short".into(),
            code: "toolong".into(),
        };
        let err: AppError = sample.validate().unwrap_err().into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), ErrorKind::ValidationError);

        let details = err.details.unwrap();
        assert_eq!(details["reason"][0], "Reason must be at least 10 characters");
        assert_eq!(details["code"][0], "code is invalid");
    }

    #[test]
    fn test_invalid_field_is_bad_request() {
        let err = AppError::invalid_field("end_date", "End date must be on or after start date");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            err.details.unwrap()["end_date"][0],
            "End date must be on or after start date"
        );
    }

    #[test]
    fn test_internal_message_is_not_leaked() {
        let response = AppError::internal_error("connection refused").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
