use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use crates::domain::value_objects::submission_contract::{UPLOAD_FAILURE_MESSAGE, UploadFailure};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::usecases::candidate_ingestion::IngestionError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(err) => {
                error!(error = ?err, "request failed");
                // Don't leak internal error detail to client
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            message,
        });

        (status, body).into_response()
    }
}

/// Request faults (bad `experience`, duplicate or unknown file parts, broken
/// multipart framing) answer 400 with the reason. Store failures keep the
/// generic 500 body.
impl IntoResponse for IngestionError {
    fn into_response(self) -> Response {
        if self.is_client_error() {
            let body = Json(UploadFailure {
                error: self.to_string(),
            });
            return (StatusCode::BAD_REQUEST, body).into_response();
        }

        error!(error = ?self, "upload failed");
        let body = Json(UploadFailure {
            error: UPLOAD_FAILURE_MESSAGE.to_string(),
        });
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
