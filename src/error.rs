//! Error taxonomy surfaced by the resource services.
//!
//! Every failure maps onto one of three kinds, which the HTTP layer turns into
//! 400 / 404 / 500 responses wrapped in the [`ApiResponse`] envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::db::store::StoreError;
use crate::report::ReportError;
use crate::utils::api_response::ApiResponse;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn required(field: impl Into<String>) -> Self {
        Self::new(field, "is required")
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed: {}", describe(.0))]
    Validation(Vec<FieldError>),

    #[error("{resource} `{id}` not found")]
    NotFound { resource: &'static str, id: String },

    #[error("service unavailable: {0}")]
    Unavailable(String),
}

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{} {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        ServiceError::Unavailable(err.to_string())
    }
}

impl From<ReportError> for ServiceError {
    fn from(err: ReportError) -> Self {
        ServiceError::Unavailable(err.to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let errors = match &self {
            ServiceError::Validation(fields) => Some(json!({ "fields": fields })),
            ServiceError::NotFound { id, .. } => Some(json!({ "id": id })),
            ServiceError::Unavailable(detail) => {
                tracing::error!(error = %detail, "request failed");
                Some(json!({ "error": detail }))
            }
        };
        let message = match &self {
            ServiceError::Validation(_) => "Validation failed".to_string(),
            ServiceError::NotFound { resource, .. } => format!("{resource} not found"),
            ServiceError::Unavailable(_) => "Service unavailable".to_string(),
        };
        ApiResponse::<()>::error(status, message, errors).into_response()
    }
}
