//! Health check payloads.

use serde::Serialize;
use utoipa::ToSchema;

/// Whether the result store is currently reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// A store is installed and answering.
    Ok,
    /// No store is installed; storage-backed routes answer 503.
    Degraded,
}

/// Body of the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Current store status.
    pub status: HealthStatus,
}

impl HealthResponse {
    /// Map the degraded flag to a response body.
    pub fn from_degraded(degraded: bool) -> Self {
        let status = if degraded {
            HealthStatus::Degraded
        } else {
            HealthStatus::Ok
        };
        Self { status }
    }
}
