use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::flow::AuthFlowError;

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

/// Caller-visible error for the credential-exchange endpoints. Each flow
/// failure kind maps to exactly one `(status, code)` pair.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code,
                message: message.into(),
            },
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "SERVER_ERROR", message)
    }

    #[cfg(test)]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<AuthFlowError> for ApiError {
    fn from(value: AuthFlowError) -> Self {
        let message = value.to_string();
        match value {
            AuthFlowError::AlreadyRegistered(_) => {
                Self::new(StatusCode::CONFLICT, "USER_ALREADY_EXISTS", message)
            }
            AuthFlowError::InvalidCredentials => {
                Self::new(StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", message)
            }
            AuthFlowError::Internal(err) => {
                // The original fault is logged, never echoed to the caller.
                error!(error = ?err, "credential exchange failed");
                Self::internal("Unexpected internal error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
