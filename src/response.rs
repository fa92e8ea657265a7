//! Transport-neutral response produced by the resource handler.

use crate::codec::{encode_array, ObjectWriter, ToFlatJson};
use crate::error::AppError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

pub const JSON: &str = "application/json";
pub const TEXT: &str = "text/plain";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

impl ApiResponse {
    pub fn json(status: StatusCode, body: String) -> Self {
        Self {
            status,
            content_type: JSON,
            body,
        }
    }

    pub fn one<T: ToFlatJson>(record: &T) -> Self {
        Self::json(StatusCode::OK, record.to_flat_json())
    }

    pub fn created<T: ToFlatJson>(record: &T) -> Self {
        Self::json(StatusCode::CREATED, record.to_flat_json())
    }

    pub fn many<T: ToFlatJson>(records: &[T]) -> Self {
        Self::json(StatusCode::OK, encode_array(records))
    }

    /// `{"mensagem": text}`.
    pub fn message(text: &str) -> Self {
        Self::json(StatusCode::OK, ObjectWriter::new().string("mensagem", text).finish())
    }

    /// Empty 200 answering a CORS preflight.
    pub fn preflight() -> Self {
        Self::json(StatusCode::OK, String::new())
    }

    /// Flat JSON error body; unsupported methods answer in plain text.
    pub fn from_error(err: &AppError) -> Self {
        let status = err.status();
        if status.is_server_error() {
            tracing::warn!(error = %err, "request failed");
        }
        match err {
            AppError::MethodNotAllowed(_) => Self {
                status,
                content_type: TEXT,
                body: err.to_string(),
            },
            _ => Self::json(status, err.to_flat_json()),
        }
    }
}

impl From<AppError> for ApiResponse {
    fn from(err: AppError) -> Self {
        Self::from_error(&err)
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}
