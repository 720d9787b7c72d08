//! Crate-wide error taxonomy
//! Mission: One error type from store to wire, mapped at the boundary

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Application error. Every handler returns `Result<_, AppError>` and the
/// `IntoResponse` impl below is the single place store/service failures
/// become HTTP status codes and JSON bodies.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("You have already RSVP'd to this event")]
    DuplicateRsvp,

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid Event Id")]
    InvalidId,

    #[error("Server Error")]
    Database(#[from] rusqlite::Error),

    #[error("Server Error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) | AppError::Conflict(_) | AppError::DuplicateRsvp => {
                StatusCode::BAD_REQUEST
            }
            // The original API answered ownership violations with 401, not 403.
            AppError::Unauthenticated(_) | AppError::Forbidden(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) | AppError::InvalidId => StatusCode::NOT_FOUND,
            AppError::Database(e) => {
                error!("Database error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Internal(e) => {
                error!("Internal error: {:#}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}
