use axum::{
    Router,
    routing::{get, post, put},
};

use super::controller::{
    apply_leave, approve_leave, get_leave, list_leaves, list_my_leaves, reject_leave,
};
use crate::state::AppState;

pub fn init_leaves_router() -> Router<AppState> {
    Router::new()
        .route("/apply", post(apply_leave))
        .route("/", get(list_leaves))
        .route("/my", get(list_my_leaves))
        .route("/{id}", get(get_leave))
        .route("/{id}/approve", put(approve_leave))
        .route("/{id}/reject", put(reject_leave))
}
