//! DTOs exchanged with the scorer wizard.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{dto::common::GroupStatusDto, state::round::GroupRound};

/// Optional filter narrowing a scorecard to one member.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScorecardQuery {
    pub player_id: Option<Uuid>,
}

/// Whether the scorer navigates in review mode.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StepQuery {
    #[serde(default)]
    pub editing: bool,
}

/// Progress of a group through its play order.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GroupProgress {
    pub status: GroupStatusDto,
    /// Step open for entry (0..17).
    pub current_step: usize,
    /// Hole played at `current_step`.
    pub current_hole: u8,
    /// Highest step whose prefix is fully confirmed; absent before the first hole.
    pub highest_confirmed_step: Option<usize>,
    /// Record version to echo back as `expected_version`.
    pub version: u64,
}

impl From<&GroupRound> for GroupProgress {
    fn from(round: &GroupRound) -> Self {
        let gate = round.gate();
        let current_step = gate.current_step();
        Self {
            status: round.phase().into(),
            current_step,
            current_hole: gate.hole_at(current_step).get(),
            highest_confirmed_step: gate.highest_confirmed_step(),
            version: round.version(),
        }
    }
}

/// Member of the group as shown on the card.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct ScorecardPlayer {
    pub player_id: Uuid,
    pub name: String,
    pub course_handicap: Option<u8>,
    pub tee_color: String,
    pub category: Option<String>,
    pub total_strokes: Option<u32>,
    /// Holes with a recorded score.
    pub through: usize,
}

/// One player's value on one hole.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct ScoreCell {
    pub player_id: Uuid,
    pub strokes: Option<u8>,
    /// Net strokes after handicap allocation; absent without a stroke index.
    pub net_strokes: Option<i32>,
    /// Yardage from the player's tee.
    pub yardage: Option<u32>,
}

/// One hole in play order.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct ScorecardHole {
    pub step: usize,
    pub hole: u8,
    pub par: u8,
    pub stroke_index: Option<u8>,
    pub image_url: Option<String>,
    /// Every member has a value on this hole.
    pub complete: bool,
    /// Values are visible but cannot be changed through the normal flow.
    pub locked: bool,
    pub scores: Vec<ScoreCell>,
}

/// Full scorecard snapshot opened with an access code.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScorecardResponse {
    pub group_id: Uuid,
    pub tournament_id: Uuid,
    pub tournament_name: String,
    pub course_name: String,
    pub start_hole: u8,
    /// Holes in play order.
    pub sequence: Vec<u8>,
    pub progress: GroupProgress,
    pub players: Vec<ScorecardPlayer>,
    pub holes: Vec<ScorecardHole>,
}

/// Single hole view returned by wizard navigation.
#[derive(Debug, Serialize, ToSchema)]
pub struct StepView {
    pub group_id: Uuid,
    /// Step that was asked for.
    pub requested_step: usize,
    /// Step actually shown after clamping.
    pub step: usize,
    pub editing: bool,
    pub progress: GroupProgress,
    pub hole: ScorecardHole,
}

/// Strokes entered for one player.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct PlayerStrokesInput {
    pub player_id: Uuid,
    /// Must be a positive integer.
    pub strokes: i64,
}

/// Submission confirming one hole for the group.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SubmitHoleScoresRequest {
    #[validate(nested)]
    pub scores: Vec<PlayerStrokesInput>,
    /// Version the scorer last saw; a stale value is rejected.
    pub expected_version: Option<u64>,
}

/// Effect of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Advanced,
    Updated,
    Unchanged,
}

/// Result of a successful hole confirmation.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitHoleScoresResponse {
    pub group_id: Uuid,
    pub hole: u8,
    pub step: usize,
    pub outcome: SubmissionOutcome,
    pub progress: GroupProgress,
}

/// Result of finishing or re-opening a card.
#[derive(Debug, Serialize, ToSchema)]
pub struct GroupStatusResponse {
    pub group_id: Uuid,
    pub progress: GroupProgress,
}
