use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::errors::PredictError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.status();
        let msg = match self {
            AppError::BadRequest(s) | AppError::Internal(s) => s,
        };
        (code, Json(ErrBody { error: msg })).into_response()
    }
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        if err.is_client_error() {
            AppError::BadRequest(err.to_string())
        } else {
            AppError::Internal(err.to_string())
        }
    }
}
