//! HTTP request handlers.

pub mod orders;
pub mod poster;

use axum::{Json, http::StatusCode};
use serde_json::{Value, json};

use crate::error::PosterError;

pub type JsonError = (StatusCode, Json<Value>);

/// HTTP status for a library error.
pub fn status_for(err: &PosterError) -> StatusCode {
    match err {
        PosterError::LocationNotFound => StatusCode::NOT_FOUND,
        PosterError::Rejected { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        e if e.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `{"error": message}` with the given status.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> JsonError {
    (status, Json(json!({ "error": message.into() })))
}
