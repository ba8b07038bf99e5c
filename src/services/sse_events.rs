use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    dto::{
        scorecard::GroupProgress,
        sse::{GroupProgressEvent, LeaderboardUpdatedEvent, ServerEvent, SystemStatus},
    },
    scoring::values::HoleNumber,
    state::{SharedState, round::GroupRound},
};

const EVENT_GROUP_PROGRESS: &str = "group.progress";
const EVENT_LEADERBOARD_UPDATED: &str = "leaderboard.updated";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Broadcast the progress of a group after its card changed.
pub fn broadcast_group_progress(state: &SharedState, round: &GroupRound, hole: Option<HoleNumber>) {
    let payload = GroupProgressEvent {
        group_id: round.id(),
        tournament_id: round.tournament_id(),
        hole: hole.map(HoleNumber::get),
        progress: GroupProgress::from(round),
    };
    send_public_event(state, EVENT_GROUP_PROGRESS, &payload);
}

/// Tell leaderboard viewers that standings of a tournament changed.
pub fn broadcast_leaderboard_updated(state: &SharedState, tournament_id: Uuid) {
    let payload = LeaderboardUpdatedEvent { tournament_id };
    send_public_event(state, EVENT_LEADERBOARD_UPDATED, &payload);
}

/// Broadcast the degraded flag after the storage supervisor flipped it.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    send_public_event(state, EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
}

fn send_public_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(payload) => {
            let viewers = state.public_sse().broadcast(payload);
            debug!(event, viewers, "public event sent");
        }
        Err(err) => warn!(event, error = %err, "failed to serialize public SSE payload"),
    }
}
