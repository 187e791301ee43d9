use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{error, warn};

pub type ApiResult<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    DatabaseError(libris_dal::Error),
}

impl From<libris_dal::Error> for ApiError {
    fn from(err: libris_dal::Error) -> Self {
        match err {
            libris_dal::Error::RecordNotFound(what) => ApiError::NotFound(what),
            libris_dal::Error::InvalidId(what) => ApiError::InvalidRequest(what),
            libris_dal::Error::Conflict(what) => ApiError::Conflict(what),
            other => ApiError::DatabaseError(other),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    status: u16,
    timestamp: OffsetDateTime,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("API error: {self}");
        } else {
            warn!("Client error: {self}");
        }
        let body = ErrorBody {
            message: self.to_string(),
            status: status.as_u16(),
            timestamp: OffsetDateTime::now_utc(),
        };
        (status, Json(body)).into_response()
    }
}
