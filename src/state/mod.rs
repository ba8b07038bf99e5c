pub mod round;
mod sse;
pub mod state_machine;
pub mod transitions;

use std::{sync::Arc, time::Duration};

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock, watch};
use tokio::time::timeout;
use tracing::warn;
use uuid::Uuid;

use crate::{config::AppConfig, dao::tournament_store::TournamentStore, error::ServiceError};

pub use self::sse::SseHub;
pub use self::state_machine::{AbortError, ApplyError, Plan, PlanError, PlanId, Snapshot};
use self::state_machine::{GroupEvent, GroupPhase, GroupStateMachine};

pub type SharedState = Arc<AppState>;
const PUBLIC_SSE_CAPACITY: usize = 64;

/// Exclusive access to one group's state machine for the length of a transaction.
pub type GroupGuard = OwnedMutexGuard<GroupStateMachine>;

/// Exclusive right to change which players belong to a tournament's groups.
pub type TournamentGuard = OwnedMutexGuard<()>;

/// Central application state storing the storage handle, SSE hub and per-group machines.
pub struct AppState {
    store: RwLock<Option<Arc<dyn TournamentStore>>>,
    sse: SseHub,
    groups: DashMap<Uuid, Arc<Mutex<GroupStateMachine>>>,
    tournaments: DashMap<Uuid, Arc<Mutex<()>>>,
    degraded: watch::Sender<bool>,
    config: Arc<AppConfig>,
    transition_timeout: Option<Duration>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        let transition_timeout = config.transition_timeout();
        Arc::new(Self {
            store: RwLock::new(None),
            sse: SseHub::new(PUBLIC_SSE_CAPACITY),
            groups: DashMap::new(),
            tournaments: DashMap::new(),
            degraded: degraded_tx,
            config: Arc::new(config),
            transition_timeout,
        })
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn store(&self) -> Option<Arc<dyn TournamentStore>> {
        let guard = self.store.read().await;
        guard.as_ref().cloned()
    }

    /// Current store or [`ServiceError::Degraded`] when none is installed.
    pub async fn require_store(&self) -> Result<Arc<dyn TournamentStore>, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new store implementation and leave degraded mode.
    pub async fn install_store(&self, store: Arc<dyn TournamentStore>) {
        {
            let mut guard = self.store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current store and enter degraded mode.
    pub async fn clear_store(&self) {
        {
            let mut guard = self.store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        &self.sse
    }

    /// Shared runtime configuration.
    pub fn config(&self) -> Arc<AppConfig> {
        self.config.clone()
    }

    /// Update and broadcast the degraded flag when the value changes.
    ///
    /// Returns whether the flag actually changed.
    pub fn update_degraded(&self, value: bool) -> bool {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        })
    }

    /// Wait for exclusive access to a group's state machine.
    ///
    /// Every read-modify-write of a group runs while holding this guard, so
    /// transactions on one group are serialized and different groups never wait
    /// on each other.
    pub async fn lock_group(&self, group_id: Uuid) -> GroupGuard {
        let slot = self
            .groups
            .entry(group_id)
            .or_insert_with(|| Arc::new(Mutex::new(GroupStateMachine::new())))
            .clone();
        slot.lock_owned().await
    }

    /// Wait for exclusive access to a tournament's group roster.
    pub async fn lock_tournament(&self, tournament_id: Uuid) -> TournamentGuard {
        let slot = self
            .tournaments
            .entry(tournament_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        slot.lock_owned().await
    }

    /// Drop the roster lock of a deleted tournament.
    pub fn forget_tournament(&self, tournament_id: Uuid) {
        self.tournaments.remove(&tournament_id);
    }

    /// Groups whose machine is cached.
    pub fn active_groups(&self) -> usize {
        self.groups.len()
    }

    /// Drop the cached machine of a deleted group.
    pub fn forget_group(&self, group_id: Uuid) {
        self.groups.remove(&group_id);
    }

    /// Plan `event` on the locked machine, run `work`, then apply or abort the plan.
    ///
    /// `work` receives the planned phase and the version the persisted record
    /// must be written with.
    pub async fn run_transition<F, Fut, T>(
        &self,
        machine: &mut GroupGuard,
        event: GroupEvent,
        work: F,
    ) -> Result<(T, GroupPhase), ServiceError>
    where
        F: FnOnce(GroupPhase, u64) -> Fut,
        Fut: std::future::Future<Output = Result<T, ServiceError>>,
    {
        let Plan {
            id: plan_id,
            to,
            version_next,
            ..
        } = machine.plan(event)?;

        let work_future = work(to, version_next);
        let outcome = if let Some(limit) = self.transition_timeout {
            match timeout(limit, work_future).await {
                Ok(result) => result,
                Err(_) => {
                    if let Err(abort_err) = machine.abort(plan_id) {
                        warn!(
                            event = ?event,
                            plan_id = %plan_id,
                            error = ?abort_err,
                            "failed to abort transition after timeout"
                        );
                    }
                    return Err(ServiceError::Timeout);
                }
            }
        } else {
            work_future.await
        };

        match outcome {
            Ok(value) => {
                let next = machine.apply(plan_id)?;
                Ok((value, next))
            }
            Err(err) => {
                if let Err(abort_err) = machine.abort(plan_id) {
                    warn!(
                        event = ?event,
                        plan_id = %plan_id,
                        error = ?abort_err,
                        "failed to abort transition after work error"
                    );
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::tournament_store::memory::MemoryTournamentStore;

    #[tokio::test]
    async fn starts_degraded_until_a_store_is_installed() {
        let state = AppState::new(AppConfig::default());
        let mut watcher = state.degraded_watcher();
        assert!(state.is_degraded());
        assert!(matches!(
            state.require_store().await,
            Err(ServiceError::Degraded)
        ));

        state
            .install_store(Arc::new(MemoryTournamentStore::new()))
            .await;
        assert!(!state.is_degraded());
        assert!(watcher.has_changed().unwrap());
        assert!(!*watcher.borrow_and_update());
    }

    #[tokio::test]
    async fn tournament_lock_is_exclusive_per_tournament() {
        let state = AppState::new(AppConfig::default());
        let (first, second) = (Uuid::new_v4(), Uuid::new_v4());

        let held = state.lock_tournament(first).await;
        assert!(state.tournaments.get(&first).unwrap().try_lock().is_err());
        let _other = state.lock_tournament(second).await;

        drop(held);
        assert!(state.tournaments.get(&first).unwrap().try_lock().is_ok());
        state.forget_tournament(first);
        assert!(state.tournaments.get(&first).is_none());
    }

    #[tokio::test]
    async fn failed_work_leaves_machine_untouched() {
        let state = AppState::new(AppConfig::default());
        let group_id = Uuid::new_v4();
        let mut machine = state.lock_group(group_id).await;

        let result: Result<((), GroupPhase), ServiceError> = state
            .run_transition(
                &mut machine,
                GroupEvent::HoleConfirmed {
                    step: 0,
                    highest_confirmed_step: Some(0),
                },
                |_, _| async { Err(ServiceError::Conflict("lost race".into())) },
            )
            .await;

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
        assert_eq!(machine.phase(), GroupPhase::INITIAL);
        assert_eq!(machine.snapshot().pending, None);
    }

    #[tokio::test]
    async fn successful_work_receives_next_version() {
        let state = AppState::new(AppConfig::default());
        let mut machine = state.lock_group(Uuid::new_v4()).await;
        machine.restore(GroupPhase::INITIAL, 7);

        let (written, phase) = state
            .run_transition(
                &mut machine,
                GroupEvent::HoleConfirmed {
                    step: 0,
                    highest_confirmed_step: Some(0),
                },
                |_, version| async move { Ok(version) },
            )
            .await
            .unwrap();

        assert_eq!(written, 8);
        assert_eq!(
            phase,
            GroupPhase::InProgress {
                highest_confirmed_step: Some(0)
            }
        );
        assert_eq!(machine.version(), 8);
    }
}
