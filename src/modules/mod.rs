pub mod attendance;
pub mod auth;
pub mod leaves;
pub mod notifications;
pub mod users;
