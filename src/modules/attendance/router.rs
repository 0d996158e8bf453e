use axum::{
    Router,
    routing::{get, post},
};

use super::controller::{attendance_stats, department_stats, list_attendance, mark_attendance};
use crate::state::AppState;

pub fn init_attendance_router() -> Router<AppState> {
    Router::new()
        .route("/mark", post(mark_attendance))
        .route("/", get(list_attendance))
        .route("/stats", get(attendance_stats))
        .route("/department", get(department_stats))
}
