use axum::{
    Router,
    routing::{get, put},
};

use super::controller::{
    admin_dashboard, change_password, faculty_dashboard, get_me, list_users, warden_dashboard,
};
use crate::state::AppState;

/// Self-service routes, open to every authenticated role.
pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/me/password", put(change_password))
}

/// The user directory. Mounted behind `require_admin`.
pub fn init_user_directory_router() -> Router<AppState> {
    Router::new().route("/", get(list_users))
}

pub fn init_dashboard_router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(admin_dashboard))
        .route("/faculty", get(faculty_dashboard))
        .route("/warden", get(warden_dashboard))
}
