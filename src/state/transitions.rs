use crate::{
    dao::models::GroupEntity,
    error::ServiceError,
    scoring::values::HoleNumber,
    services::sse_events::{broadcast_group_progress, broadcast_leaderboard_updated},
    state::{
        GroupGuard, SharedState,
        round::GroupRound,
        state_machine::{GroupEvent, GroupPhase},
    },
};

/// Execute a planned group transition that persists a new record, then broadcast the
/// resulting progress and ask leaderboard viewers to refresh.
pub async fn run_transition_with_broadcast<F, Fut>(
    state: &SharedState,
    machine: &mut GroupGuard,
    event: GroupEvent,
    hole: Option<HoleNumber>,
    work: F,
) -> Result<GroupRound, ServiceError>
where
    F: FnOnce(GroupPhase, u64) -> Fut,
    Fut: std::future::Future<Output = Result<GroupEntity, ServiceError>>,
{
    let (record, _) = state.run_transition(machine, event, work).await?;
    let round = GroupRound::try_from(record)?;
    broadcast_group_progress(state, &round, hole);
    broadcast_leaderboard_updated(state, round.tournament_id());
    Ok(round)
}
