//! Typed errors and HTTP mapping.

use crate::codec::ObjectWriter;
use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// A field invariant failed while constructing or mutating an entity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// Wire name of the offending field.
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Lookup by key found nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: i32,
}

/// Structurally broken flat JSON.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("payload must be a JSON object wrapped in braces")]
    NotAnObject,
    #[error("unterminated string starting at byte {0}")]
    UnterminatedString(usize),
    #[error("unexpected '{found}' at byte {at}: only flat objects are supported")]
    UnexpectedStructure { found: char, at: usize },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("storage: {0}")]
    Storage(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("no route for {0}")]
    UnknownRoute(String),
    #[error("method {0} not allowed")]
    MethodNotAllowed(Method),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Config(_) | AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) | AppError::UnknownRoute(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::Decode(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    StatusCode::NOT_FOUND
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// `{"erro": message}`, plus `"campo"` naming the field for validation failures.
    pub fn to_flat_json(&self) -> String {
        let writer = ObjectWriter::new().string("erro", &self.to_string());
        match self {
            AppError::Validation(e) => writer.string("campo", e.field).finish(),
            _ => writer.finish(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status(),
            [(header::CONTENT_TYPE, "application/json")],
            self.to_flat_json(),
        )
            .into_response()
    }
}
