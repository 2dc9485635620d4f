use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use service::ServiceError;
use thiserror::Error;
use tracing::error;

pub const MALFORMED_BODY: &str = "Malformed request body";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed id, header or body; never retried.
    #[error("{0}")]
    Validation(String),
    #[error("Entity not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] ServiceError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = self.to_string();
        if let ApiError::Store(_) = self {
            error!(error = %msg, "record store failure");
        }
        (status, Json(ErrorBody::new(msg))).into_response()
    }
}

/// Response for a handler that panicked; the panic itself is logged by the process hook.
pub fn panic_response(_err: Box<dyn Any + Send + 'static>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new("Internal server error")),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_statuses() {
        assert_eq!(ApiError::Validation("x".into()).status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        let store = ApiError::from(ServiceError::Persistence("gone".into()));
        assert_eq!(store.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(store.to_string(), "persistence error: gone");
    }
}
