//! Errors surfaced by request handlers.

use crate::form::FormError;
use crate::models::ApiResponse;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use diabetes_inferences::PredictionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid patient data: {0}")]
    Form(#[from] FormError),

    #[error("Prediction failed: {0}")]
    Prediction(#[from] PredictionError),

    #[error("Invalid request body: {0}")]
    Payload(String),

    #[error("Prediction was interrupted: {0}")]
    Blocking(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Form(_) | AppError::Payload(_) => StatusCode::BAD_REQUEST,
            AppError::Prediction(_) | AppError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiResponse::<()>::error(&self.to_string()))
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        AppError::Blocking(err.to_string())
    }
}

impl From<actix_web::error::JsonPayloadError> for AppError {
    fn from(err: actix_web::error::JsonPayloadError) -> Self {
        AppError::Payload(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;

    #[test]
    fn payload_errors_are_bad_requests_in_the_envelope() {
        let err = AppError::Payload("unknown field `Glucosee`".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let body = err.error_response().into_body().try_into_bytes().unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Invalid request body: unknown field `Glucosee`");
    }

    #[test]
    fn blocking_errors_are_server_errors() {
        let err = AppError::Blocking("thread pool is gone".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
