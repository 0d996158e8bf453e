//! # Hallpass DB
//!
//! Storage for the Hallpass API.
//!
//! - [`CampusStore`]: the async storage trait services depend on
//! - [`PgStore`]: PostgreSQL backend (sqlx)
//! - [`MemoryStore`]: in-memory backend for tests and local runs
//! - [`StoreError`]: backend failures, convertible into `AppError`
//!
//! # Example
//!
//! ```ignore
//! use hallpass_config::DatabaseConfig;
//! use hallpass_db::build_store;
//!
//! let store = build_store(&DatabaseConfig::from_env()).await?;
//! let leave = store.find_leave(leave_id).await?;
//! ```

use std::sync::Arc;

use hallpass_config::{DatabaseConfig, StorageBackend};
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{AttendanceQuery, CampusStore, LeaveQuery, StoreResult, UserQuery};

// Re-export PgPool for convenience
pub use sqlx::PgPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Opens a PostgreSQL pool sized from the config.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
    let url = config
        .url
        .as_deref()
        .ok_or_else(|| StoreError::Config("DATABASE_URL must be set".to_string()))?;

    Ok(PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(url)
        .await?)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), StoreError> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Builds the configured backend. PostgreSQL is migrated before use.
pub async fn build_store(config: &DatabaseConfig) -> Result<Arc<dyn CampusStore>, StoreError> {
    match config.backend {
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Postgres => {
            let pool = init_db_pool(config).await?;
            run_migrations(&pool).await?;
            tracing::info!(max_connections = config.max_connections, "connected to PostgreSQL");
            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}
