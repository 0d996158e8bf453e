//! # Hallpass Config
//!
//! Configuration types for the Hallpass API, loaded from environment variables:
//!
//! - [`jwt`]: JWT authentication configuration
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`email`]: Email/SMTP configuration
//! - [`database`]: Storage backend and connection pool settings
//! - [`notifications`]: Notification queue and reminder schedule
//! - [`server`]: Listen address
//!
//! # Example
//!
//! ```ignore
//! use hallpass_config::{DatabaseConfig, JwtConfig};
//!
//! dotenvy::dotenv().ok();
//! let jwt_config = JwtConfig::from_env();
//! let database = DatabaseConfig::from_env();
//! ```

pub mod cors;
pub mod database;
pub mod email;
pub mod jwt;
pub mod notifications;
pub mod server;

// Re-export commonly used types at crate root
pub use cors::CorsConfig;
pub use database::{DatabaseConfig, StorageBackend};
pub use email::EmailConfig;
pub use jwt::JwtConfig;
pub use notifications::NotificationConfig;
pub use server::ServerConfig;

/// Reads and parses an environment variable, falling back when unset or malformed.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

pub(crate) fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| parse_flag(&v))
        .unwrap_or(default)
}

pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}
