use crate::model::ErrorResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use keyhole_core::ErrorClass;
use keyhole_resolver::ResolveError;
use keyhole_router::CreateError;
use thiserror::Error;
use tracing::debug;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Create(#[from] CreateError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// The body could not be decoded into a create request.
    #[error("invalid payload: {0}")]
    MalformedBody(String),
}

impl AppError {
    pub fn class(&self) -> ErrorClass {
        match self {
            AppError::Create(err) => err.class(),
            AppError::Resolve(err) => err.class(),
            AppError::MalformedBody(_) => ErrorClass::BadRequest,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.class() {
            ErrorClass::BadRequest => StatusCode::BAD_REQUEST,
            ErrorClass::NotFound => StatusCode::NOT_FOUND,
            ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message sent to the caller. Internal failures carry no backend detail.
    fn public_message(&self) -> String {
        match self.class() {
            ErrorClass::BadRequest => self.to_string(),
            ErrorClass::NotFound => "not found".to_string(),
            ErrorClass::Internal => "internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        debug!(status = %status, error = %self, "request failed");
        let body = ErrorResponse {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}
