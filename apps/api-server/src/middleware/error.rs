//! Error mapping - every failure becomes the API's `{errors: [...]}` body,
//! except login failures which answer with the login acknowledgment shape.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::fmt;

use blog_core::error::RepoError;
use blog_shared::ErrorBody;
use blog_shared::dto::LoginResponse;

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    /// Malformed or missing input; carries every violation found in one pass.
    Validation(Vec<String>),
    /// Unknown or invalid identifier.
    NotFound(String),
    /// Unknown account or failed password verification.
    LoginFailed,
    /// Unexpected persistence failure, surfaced with the raw message.
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(errors) => write!(f, "Validation errors: {:?}", errors),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::LoginFailed => write!(f, "Login failed"),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::LoginFailed => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Validation(errors) => {
                HttpResponse::BadRequest().json(ErrorBody::new(errors.clone()))
            }
            AppError::NotFound(msg) => HttpResponse::NotFound().json(ErrorBody::single(msg.clone())),
            AppError::LoginFailed => HttpResponse::Forbidden().json(LoginResponse {
                login: false,
                message: "Invalid username or password".to_string(),
            }),
            AppError::Internal(msg) => {
                tracing::error!("Persistence failure: {}", msg);
                HttpResponse::InternalServerError().json(ErrorBody::single(msg.clone()))
            }
        }
    }
}

// Conversion from repository errors. Handlers that want a more specific
// message (e.g. naming the missing id) match on RepoError themselves.
impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::Validation(vec![msg]),
            RepoError::Connection(msg) | RepoError::Query(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
