//! Error response DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard error response format.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "code": "invalidLogin",
    "message": "Login did not match the specs",
    "request_id": "3f1c1e9a-8a2b-4d55-9a5e-2c7f0f6f0b1d"
}))]
pub struct ErrorResponse {
    /// Machine-readable error code, e.g. `invalidRequest` or `duplicateEmail`
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            request_id: None,
        }
    }

    /// Adds request ID to the error response for correlation.
    pub fn with_request_id(mut self, request_id: &str) -> Self {
        self.request_id = Some(request_id.to_string());
        self
    }
}
