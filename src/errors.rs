//! Application error taxonomy.
//!
//! Every domain error maps to one of the kinds in SPEC_FULL.md §7: input-shape,
//! precondition, authorization, not-found, conflict, infrastructure. The wire
//! contract is a JSON body `{detail, type}` with a stable `type` tag per kind.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid input: {0}")]
    Invalid(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("jwt error: {0}")]
    Jwt(String),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl AppError {
    pub fn to_response(&self) -> (StatusCode, ErrorBody) {
        let (status, kind) = match self {
            AppError::Invalid(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            AppError::InvalidState(_) => (StatusCode::BAD_REQUEST, "invalid_state"),
            AppError::Unauthorized(_) => (StatusCode::FORBIDDEN, "unauthorized"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::Database(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
            AppError::Jwt(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
        };

        (
            status,
            ErrorBody {
                detail: self.to_string(),
                kind,
            },
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.to_response();
        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("record not found".into()),
            other => AppError::Database(other.to_string()),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        AppError::Jwt(e.to_string())
    }
}
