use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// JSON envelope used for health checks and every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub status_code: u16,
    pub message: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<serde_json::Value>,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response
    pub fn success(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            success: true,
            status_code: status.as_u16(),
            message: message.into(),
            timestamp: Utc::now().to_rfc3339(),
            data: Some(data),
            errors: None,
        }
    }

    /// Create an error response
    pub fn error(
        status: StatusCode,
        message: impl Into<String>,
        errors: Option<serde_json::Value>,
    ) -> Self {
        ApiResponse {
            success: false,
            status_code: status.as_u16(),
            message: message.into(),
            timestamp: Utc::now().to_rfc3339(),
            data: None,
            errors,
        }
    }
}

impl<T> ApiResponse<T> {
    /// Message plus any per-field errors, for showing to a user.
    pub fn describe(&self) -> String {
        let fields = self
            .errors
            .as_ref()
            .and_then(|e| e.get("fields"))
            .and_then(|f| f.as_array())
            .map(|fields| {
                fields
                    .iter()
                    .filter_map(|f| Some(format!("{} {}", f.get("field")?.as_str()?, f.get("message")?.as_str()?)))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        if fields.is_empty() {
            self.message.clone()
        } else {
            format!("{}: {}", self.message, fields.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn describe_lists_field_errors() {
        let response = ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Validation failed",
            Some(json!({ "fields": [{ "field": "date", "message": "cannot be in the future" }] })),
        );
        assert_eq!(response.describe(), "Validation failed: date cannot be in the future");

        let response = ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Design request not found", None);
        assert_eq!(response.describe(), "Design request not found");
    }
}
