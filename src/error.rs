use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Request-terminal error taxonomy. Every failure surfaces directly as the
/// HTTP response body; nothing is retried or swallowed.
#[derive(Debug)]
pub enum AppError {
    InvalidArgument(String),
    Unauthenticated(String),
    NotFound(String),
    AlreadyExists(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    code: i32,
    error_message: String,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            AppError::InvalidArgument(msg)
            | AppError::Unauthenticated(msg)
            | AppError::NotFound(msg)
            | AppError::AlreadyExists(msg)
            | AppError::Internal(msg) => msg,
        };

        let body = Json(ErrorResponse {
            code: status.as_u16() as i32,
            error_message,
        });

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            other => {
                tracing::error!("Database error: {:?}", other);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(e: bcrypt::BcryptError) -> Self {
        tracing::error!("Hashing error: {:?}", e);
        AppError::Internal("Hashing error".to_string())
    }
}
