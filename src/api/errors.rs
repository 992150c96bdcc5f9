use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::{alerts::FilterError, error::ApiError};

/// JSON error body `{"error": "..."}` for the `/api` routes.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid filter: {0}")]
    BadRequest(#[from] FilterError),
    #[error(transparent)]
    Upstream(#[from] ApiError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
