use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Bad habit index, wrong vector length, malformed date key. State is unchanged.
    #[error("invalid input: {0}")]
    Validation(String),
    /// The backing store could not be read or written. The mutation has no durable effect.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("rollover callback failed: {0}")]
    ScheduleCallback(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unavailable(err: impl std::error::Error) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let status = match err {
            CoreError::Validation(_) => StatusCode::BAD_REQUEST,
            CoreError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CoreError::ScheduleCallback(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
