use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{storage::StorageError, tournament_store::TournamentStore},
    services::sse_events::broadcast_system_status,
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

fn set_degraded(state: &SharedState, degraded: bool) {
    if state.update_degraded(degraded) {
        broadcast_system_status(state, degraded);
    }
}

fn backoff(delay: Duration) -> Duration {
    (delay * 2).min(MAX_DELAY)
}

/// Keep a score store installed, entering degraded mode while it cannot be reached.
///
/// Scorers get 503 answers while degraded; no confirmation is accepted until the
/// store answers again.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn TournamentStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                state.install_store(store.clone()).await;
                broadcast_system_status(&state, false);
                info!("score store connected; scoring open");
                delay = INITIAL_DELAY;

                watch_store(&state, store.as_ref()).await;

                warn!("score store lost; dropping the connection");
                state.clear_store().await;
                broadcast_system_status(&state, true);
            }
            Err(err) => warn!(error = %err, "score store connection attempt failed"),
        }

        sleep(delay).await;
        delay = backoff(delay);
    }
}

/// Poll the store until it fails and cannot be recovered in place.
async fn watch_store(state: &SharedState, store: &dyn TournamentStore) {
    loop {
        if store.health_check().await.is_ok() {
            if state.is_degraded() {
                info!("score store healthy again; scoring open");
                set_degraded(state, false);
            }
        } else if recover(state, store).await {
            set_degraded(state, false);
        } else {
            return;
        }
        sleep(HEALTH_POLL_INTERVAL).await;
    }
}

/// Retry the store's own reconnect with backoff; degraded mode starts on the first failure.
async fn recover(state: &SharedState, store: &dyn TournamentStore) -> bool {
    let mut delay = INITIAL_DELAY;
    for attempt in 0..MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "score store reconnected after failed health check");
                return true;
            }
            Err(err) => {
                warn!(attempt, error = %err, "score store reconnect failed");
                if attempt == 0 {
                    set_degraded(state, true);
                }
                sleep(delay).await;
                delay = backoff(delay);
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig, dao::tournament_store::memory::MemoryTournamentStore,
        state::AppState,
    };

    #[tokio::test]
    async fn installs_the_store_and_leaves_degraded_mode() {
        let state = AppState::new(AppConfig::default());
        let mut receiver = state.public_sse().subscribe();

        let supervisor = tokio::spawn(run(state.clone(), || async {
            Ok(Arc::new(MemoryTournamentStore::new()) as Arc<dyn TournamentStore>)
        }));

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event.as_deref(), Some("system.status"));
        assert_eq!(event.data, r#"{"degraded":false}"#);
        assert!(!state.is_degraded());
        assert!(state.require_store().await.is_ok());

        supervisor.abort();
    }
}
