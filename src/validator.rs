use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use hallpass_core::AppError;

/// JSON body extractor that also runs the payload's `validator` rules.
///
/// Malformed bodies and bodies that break a field rule are both rejected with
/// 400. Rule failures carry per-field details.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

/// Splits `...target type: <path>: <reason> at line N column M` into the
/// field path and the serde reason, when the reason starts with `marker`.
fn field_failure(error_msg: &str, marker: &str) -> Option<(String, String)> {
    let (_, detail) = error_msg.split_once("target type: ")?;
    let (path, rest) = detail.split_once(": ")?;
    if path.is_empty() || !rest.starts_with(marker) {
        return None;
    }
    let reason = rest.split(" at line").next().unwrap_or(rest);
    Some((path.to_string(), reason.to_string()))
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    let error_msg = rejection.body_text();

    if error_msg.contains("missing field") {
        let field = error_msg
            .split("missing field `")
            .nth(1)
            .and_then(|s| s.split('`').next())
            .unwrap_or("unknown");
        return AppError::invalid_field(field, format!("{} is required", field));
    }

    if let Some((field, reason)) = field_failure(&error_msg, "unknown variant") {
        return AppError::invalid_field(&field, format!("Invalid value for {}: {}", field, reason));
    }

    if let Some((field, _)) = field_failure(&error_msg, "invalid type") {
        return AppError::invalid_field(&field, format!("Invalid type for {}", field));
    }

    if error_msg.contains("unknown variant") {
        return AppError::bad_request(anyhow!("Invalid value in request: {}", error_msg));
    }

    if error_msg.contains("invalid type") {
        return AppError::bad_request(anyhow!("Invalid field type in request"));
    }

    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return AppError::bad_request(anyhow!("Missing 'Content-Type: application/json' header"));
    }

    AppError::bad_request(anyhow!("Invalid request body"))
}

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}
