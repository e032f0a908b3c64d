use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

/// Every way token verification can fail, kept machine-distinguishable so the
/// middleware and downstream authorization can react precisely.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token is not structurally valid: {0}")]
    Malformed(String),
    #[error("token signature does not match")]
    SignatureInvalid,
    #[error("token has expired")]
    Expired,
    #[error("invalid claim '{0}' with value '{1}'")]
    InvalidClaim(&'static str, String),
    #[error("malformed claim payload: {0}")]
    InvalidJson(String),
    #[error("authorization header missing")]
    MissingAuthorization,
    #[error("authorization header malformed")]
    InvalidAuthorization,
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match value.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName => Self::SignatureInvalid,
            _ => Self::Malformed(value.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AuthError::MissingAuthorization | AuthError::InvalidAuthorization => {
                (StatusCode::UNAUTHORIZED, "AUTH_HEADER")
            }
            AuthError::Malformed(_) | AuthError::SignatureInvalid | AuthError::Expired => {
                (StatusCode::UNAUTHORIZED, "AUTH_TOKEN")
            }
            AuthError::InvalidClaim(_, _) | AuthError::InvalidJson(_) => {
                (StatusCode::BAD_REQUEST, "AUTH_CLAIMS")
            }
        };

        let body = ErrorBody {
            code,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
