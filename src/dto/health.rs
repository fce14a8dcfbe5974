use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall service health.
    pub status: HealthStatus,
}

/// Coarse health states the coordinator can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Storage is reachable; rooms are durably snapshotted.
    Ok,
    /// No storage backend; rooms live in memory only.
    Degraded,
}

impl HealthResponse {
    /// Create a health response indicating the system is fully operational.
    pub fn ok() -> Self {
        Self {
            status: HealthStatus::Ok,
        }
    }

    /// Create a health response indicating the system runs without storage.
    pub fn degraded() -> Self {
        Self {
            status: HealthStatus::Degraded,
        }
    }
}
