//! DTOs for leaderboards and player history.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::scoring::leaderboard::{LeaderboardView, Standing};

/// Leaderboard query parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardQuery {
    /// `net` (default) or `gross`.
    pub view: Option<LeaderboardView>,
    /// Restrict the response to a single category board.
    pub category: Option<String>,
}

/// Sub-totals used to split exact ties.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct TieBreakDto {
    pub last9: Option<u32>,
    pub last6: Option<u32>,
    pub last3: Option<u32>,
    pub last1: Option<u32>,
}

/// One ranked row.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct StandingDto {
    pub rank: usize,
    pub player_id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub course_handicap: Option<u8>,
    pub total_strokes: Option<u32>,
    pub through: usize,
    pub to_par: Option<i32>,
    pub net_score: Option<i32>,
    pub tie_break: TieBreakDto,
}

impl From<Standing> for StandingDto {
    fn from(value: Standing) -> Self {
        Self {
            rank: value.rank,
            player_id: value.player_id,
            name: value.name,
            category: value.category,
            course_handicap: value.course_handicap.map(|h| h.get()),
            total_strokes: value.total_strokes,
            through: value.through,
            to_par: value.to_par,
            net_score: value.net_score,
            tie_break: TieBreakDto {
                last9: value.tie_break.last9,
                last6: value.tie_break.last6,
                last3: value.tie_break.last3,
                last1: value.tie_break.last1,
            },
        }
    }
}

/// Ranked tournament view.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    pub tournament_id: Uuid,
    pub tournament_name: String,
    pub view: LeaderboardView,
    /// Overall board; empty until someone records a score.
    pub players: Vec<StandingDto>,
    /// Independent boards per category, in declared order.
    #[schema(value_type = Object)]
    pub categories: IndexMap<String, Vec<StandingDto>>,
}

/// One hole of a player's round.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct HoleHistoryRow {
    pub hole: u8,
    pub par: u8,
    pub stroke_index: Option<u8>,
    pub yardage: Option<u32>,
    pub strokes: Option<u8>,
    pub net_strokes: Option<i32>,
}

/// Hole-by-hole detail of one player's round, in official order.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerHistoryResponse {
    pub tournament_id: Uuid,
    pub player_id: Uuid,
    pub name: String,
    pub tee_color: String,
    pub course_handicap: Option<u8>,
    pub total_strokes: Option<u32>,
    pub net_score: Option<i32>,
    pub holes: Vec<HoleHistoryRow>,
}
