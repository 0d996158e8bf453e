use axum::{
    Json,
    extract::{Path, Query, State},
};
use hallpass_core::AppError;
use hallpass_models::NotificationId;
use tracing::instrument;

use super::model::{MarkAllReadResponse, Notification, NotificationListParams, UnreadCountResponse};
use super::service::NotificationService;
use crate::middleware::scope::Actor;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::MessageResponse;
use crate::state::AppState;

/// List the caller's notifications, newest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    params(NotificationListParams),
    responses(
        (status = 200, description = "Notifications", body = Vec<Notification>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
#[instrument(skip(state))]
pub async fn list_notifications(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<NotificationListParams>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let notifications = NotificationService::list(state.store.as_ref(), actor.id, &params).await?;
    Ok(Json(notifications))
}

#[utoipa::path(
    get,
    path = "/api/notifications/unread-count",
    responses(
        (status = 200, description = "Number of unread notifications", body = UnreadCountResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
#[instrument(skip(state))]
pub async fn unread_count(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<UnreadCountResponse>, AppError> {
    Ok(Json(
        NotificationService::unread_count(state.store.as_ref(), actor.id).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/notifications/{id}/read",
    params(("id" = String, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Marked as read", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Notification not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
#[instrument(skip(state))]
pub async fn mark_read(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<NotificationId>,
) -> Result<Json<MessageResponse>, AppError> {
    NotificationService::mark_read(state.store.as_ref(), actor.id, id).await?;
    Ok(Json(MessageResponse::new("Notification marked as read")))
}

#[utoipa::path(
    put,
    path = "/api/notifications/read-all",
    responses(
        (status = 200, description = "All notifications marked as read", body = MarkAllReadResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
#[instrument(skip(state))]
pub async fn mark_all_read(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<MarkAllReadResponse>, AppError> {
    Ok(Json(
        NotificationService::mark_all_read(state.store.as_ref(), actor.id).await?,
    ))
}
