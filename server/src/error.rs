use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gptnix::{AskError, StoreError};
use shared::{ApiErrorBody, TECHNICAL_DIFFICULTIES};

/// Every internal failure reaches the browser as the same generic message;
/// the detail has already been logged where it happened.
#[derive(Debug)]
pub enum ApiError {
    TechnicalDifficulties,
}

impl From<AskError> for ApiError {
    fn from(_: AskError) -> Self {
        ApiError::TechnicalDifficulties
    }
}

impl From<StoreError> for ApiError {
    fn from(_: StoreError) -> Self {
        ApiError::TechnicalDifficulties
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::TechnicalDifficulties => {
                (StatusCode::INTERNAL_SERVER_ERROR, "technical_difficulties")
            }
        };

        let body = ApiErrorBody {
            error: error.to_owned(),
            message: TECHNICAL_DIFFICULTIES.to_owned(),
        };

        (status, Json(body)).into_response()
    }
}
