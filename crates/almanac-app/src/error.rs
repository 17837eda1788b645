use almanac_core::error::CoreError;
use almanac_service::error::ServiceError;
use salvo::Response;
use salvo::http::StatusCode;
use salvo::writing::Json;
use serde::Serialize;
use thiserror::Error;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] ServiceError),

    #[error(transparent)]
    DatabaseError(#[from] almanac_db::error::DbError),

    #[error(transparent)]
    CoreError(#[from] CoreError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,
}

pub type AppResult<T> = std::result::Result<T, AppError>;

/// Error body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

const fn core_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::InvalidWindow { .. } | CoreError::ValidationError(_) => {
            StatusCode::BAD_REQUEST
        }
        CoreError::InvalidConfiguration(_) | CoreError::InvariantViolation(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl AppError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::ServiceError(err) => match err {
                ServiceError::InvalidWindow { .. } | ServiceError::ValidationError(_) => {
                    StatusCode::BAD_REQUEST
                }
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
                ServiceError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                ServiceError::CoreError(core) => core_status(core),
            },
            Self::DatabaseError(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::CoreError(core) => core_status(core),
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    /// ## Summary
    /// Writes this error as a JSON `{ "error": ... }` body with its status code.
    ///
    /// Server-side failures are logged and reported with a generic message.
    pub fn render(&self, res: &mut Response) {
        let status = self.status_code();
        let message = if status.is_server_error() {
            tracing::error!(error = ?self, status = %status, "Request failed");
            status
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_string()
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
            self.to_string()
        };

        res.status_code(status);
        res.render(Json(ErrorResponse { error: message }));
    }
}
