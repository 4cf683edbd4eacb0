//! Health check DTOs for API responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Probe response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "status": "healthy",
    "version": "0.1.0",
    "timestamp": "2025-01-01T12:00:00Z",
    "storage": "memory"
}))]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    /// Time of the check (RFC 3339)
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: String,
    /// Configured store backend, reported by the readiness probe only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthResponse {
    pub fn new(status: HealthStatus) -> Self {
        Self {
            status,
            version: crate::pkg_version().to_string(),
            timestamp: jiff::Timestamp::now().to_string(),
            storage: None,
        }
    }

    pub fn with_storage(mut self, storage: &str) -> Self {
        self.storage = Some(storage.to_string());
        self
    }
}
