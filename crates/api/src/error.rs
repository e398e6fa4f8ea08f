use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("authentication required")]
    Unauthorized,

    // deliberately does not say whether the email exists
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("admin access required")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("already registered for this tournament")]
    AlreadyRegistered,

    #[error("database error")]
    Db(#[from] sqlx::Error),

    #[error("internal error")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::AlreadyRegistered => StatusCode::CONFLICT,
            AppError::Db(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Storage internals are logged, never returned to the client.
        match &self {
            AppError::Db(e) => tracing::error!(error = %e, "database error"),
            AppError::Internal(e) => tracing::error!(error = %e, "internal error"),
            _ => {}
        }

        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

impl AppError {
    /// Map a storage error from an insert guarded by a unique constraint:
    /// the violation becomes the supplied conflict error, anything else
    /// stays a database error.
    pub fn on_unique_violation(err: sqlx::Error, conflict: AppError) -> AppError {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => conflict,
            _ => AppError::Db(err),
        }
    }
}
