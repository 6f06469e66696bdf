use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("An error occurred during image analysis. Please try again.")]
    ImageAnalysis,
    #[error("Failed to read the image file.")]
    FileRead,
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Config(_) | AppError::Io(_) | AppError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ImageAnalysis => StatusCode::BAD_GATEWAY,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::FileRead | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        (status, self.to_string()).into_response()
    }
}
