use serde::Serialize;
use utoipa::ToSchema;

/// Overall verdict of the `/healthcheck` probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Store reachable, scores can be confirmed.
    Ok,
    /// Writes are refused until the store comes back.
    Degraded,
}

/// Health probe body: scorers can keep entering scores only while `status` is `ok`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    /// Whether the score store answered its ping.
    pub store_reachable: bool,
    /// Groups with a state machine currently held in memory.
    pub active_groups: usize,
}

impl HealthResponse {
    /// Derive the verdict from the probe results.
    pub fn new(store_reachable: bool, degraded: bool, active_groups: usize) -> Self {
        let status = if store_reachable && !degraded {
            HealthStatus::Ok
        } else {
            HealthStatus::Degraded
        };
        Self {
            status,
            store_reachable,
            active_groups,
        }
    }
}
