// src/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum KeepError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("name is required")]
    InvalidName,

    #[error("invalid json")]
    InvalidJson,

    #[error("invalid query")]
    InvalidQuery,

    #[error("file already exists")]
    AlreadyExists,

    #[error("file not found")]
    NoteNotFound,

    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    RouteNotFound,
}

pub type Result<T> = std::result::Result<T, KeepError>;

impl KeepError {
    pub fn status(&self) -> StatusCode {
        match self {
            KeepError::InvalidName
            | KeepError::InvalidJson
            | KeepError::InvalidQuery
            | KeepError::AlreadyExists
            | KeepError::NoteNotFound => StatusCode::BAD_REQUEST,
            KeepError::Unauthorized => StatusCode::UNAUTHORIZED,
            KeepError::RouteNotFound => StatusCode::NOT_FOUND,
            KeepError::Io(_) | KeepError::Json(_) | KeepError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for KeepError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Internal failures are logged here and reported generically
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("request failed: {}", self);
            "internal error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
