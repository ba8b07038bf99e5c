use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Ping the score store and report whether scoring is currently possible.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let store_reachable = match state.require_store().await {
        Ok(store) => match store.health_check().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "score store ping failed");
                false
            }
        },
        Err(_) => {
            warn!("no score store installed (degraded mode)");
            false
        }
    };

    HealthResponse::new(store_reachable, state.is_degraded(), state.active_groups())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, dto::health::HealthStatus, state::AppState};

    #[tokio::test]
    async fn missing_store_reports_degraded() {
        let state = AppState::new(AppConfig::default());
        let health = health_status(&state).await;
        assert_eq!(health.status, HealthStatus::Degraded);
        assert!(!health.store_reachable);
    }

    #[tokio::test]
    async fn installed_store_reports_ok() {
        let state = crate::services::test_support::memory_state().await;
        let health = health_status(&state).await;
        assert_eq!(health.status, HealthStatus::Ok);
        assert_eq!(health.active_groups, 0);
    }
}
