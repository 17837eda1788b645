use almanac_core::error::CoreError;
use almanac_db::error::DbError;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] DbError),

    #[error("Invalid window: start {start} is after end {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    CoreError(CoreError),
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidWindow { start, end } => Self::InvalidWindow { start, end },
            CoreError::ValidationError(msg) => Self::ValidationError(msg),
            other => Self::CoreError(other),
        }
    }
}

impl From<diesel::result::Error> for ServiceError {
    fn from(err: diesel::result::Error) -> Self {
        Self::StorageUnavailable(DbError::from(err))
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
