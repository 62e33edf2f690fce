use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tickerfolio_core::errors::Error as CoreError;

/// Message the dashboard shows when a refresh fails.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch stock data";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("Not Found")]
    NotFound,
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            // The cause stays in the logs, clients get a generic message
            ApiError::Core(e) => {
                tracing::error!("Error fetching stock data: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    FETCH_FAILED_MESSAGE.to_string(),
                )
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: msg,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
