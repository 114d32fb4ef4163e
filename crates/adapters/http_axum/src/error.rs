//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use roomctl_domain::error::RoomCtlError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`RoomCtlError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(RoomCtlError);

impl From<RoomCtlError> for ApiError {
    fn from(err: RoomCtlError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            RoomCtlError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            RoomCtlError::InvalidDevice(_) | RoomCtlError::EmptyRoom(_) => {
                (StatusCode::BAD_REQUEST, self.0.to_string())
            }
            RoomCtlError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            RoomCtlError::Cancelled(_) => (StatusCode::GATEWAY_TIMEOUT, self.0.to_string()),
            RoomCtlError::UnknownDriver { .. } => {
                tracing::error!(error = %self.0, "room references an unregistered driver");
                (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string())
            }
            RoomCtlError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
