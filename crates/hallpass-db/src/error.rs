use hallpass_core::AppError;
use thiserror::Error;

/// Failures surfaced by a [`crate::CampusStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness or exclusion rule rejected the write.
    #[error("{0}")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("storage misconfigured: {0}")]
    Config(String),
}

impl StoreError {
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(message) => AppError::conflict(anyhow::anyhow!(message)),
            StoreError::NotFound(entity) => {
                AppError::not_found(anyhow::anyhow!("{} not found", entity))
            }
            other => AppError::internal(other),
        }
    }
}
