use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::EntityKind;

/// Failures produced by the directory's stores, forms and services.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: i32 },

    /// A show was booked against an artist or venue that does not exist.
    #[error("{entity} {id} does not exist")]
    InvalidReference { entity: EntityKind, id: i32 },

    #[error("persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("missing form field `{0}`")]
    MissingField(&'static str),

    #[error("invalid form input: {0}")]
    Validation(String),
}

impl BookingError {
    pub fn not_found(entity: EntityKind, id: i32) -> Self {
        BookingError::NotFound { entity, id }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            BookingError::NotFound { .. } => StatusCode::NOT_FOUND,
            BookingError::InvalidReference { .. }
            | BookingError::MissingField(_)
            | BookingError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BookingError::PersistenceFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for BookingError {
    fn from(e: sqlx::Error) -> Self {
        BookingError::PersistenceFailure(e.to_string())
    }
}

impl From<validator::ValidationErrors> for BookingError {
    fn from(e: validator::ValidationErrors) -> Self {
        BookingError::Validation(e.to_string())
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {:?}", self);
        }

        // Storage details stay in the log
        let message = match &self {
            BookingError::PersistenceFailure(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}
