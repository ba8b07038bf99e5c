//! Leaderboard aggregation and ranking.
//!
//! Players are ordered on net (or gross) total, lower first. Exact ties fall
//! back to the back-nine, last-six, last-three and last-hole sub-totals taken in
//! official hole order, not play order. Players still tied after the last hole
//! share a rank and keep their input order. Missing values always sort last.

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    handicap::net_total,
    values::{CourseHandicap, HOLES_PER_ROUND, HoleNumber, Par, Strokes},
};

/// Column the leaderboard is ranked on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardView {
    /// Gross minus course handicap.
    #[default]
    Net,
    /// Raw stroke total.
    Gross,
}

/// One player's round as read from the score store.
#[derive(Debug, Clone)]
pub struct PlayerRound {
    /// Player identifier.
    pub player_id: Uuid,
    /// Display name.
    pub name: String,
    /// Category the player competes in, if any.
    pub category: Option<String>,
    /// Course handicap; `None` plays off scratch.
    pub course_handicap: Option<CourseHandicap>,
    /// Recorded holes, in any order.
    pub holes: Vec<(HoleNumber, Strokes)>,
}

/// Back-of-card sub-totals used to split exact ties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TieBreak {
    /// Strokes on holes 10 to 18.
    pub last9: Option<u32>,
    /// Strokes on holes 13 to 18.
    pub last6: Option<u32>,
    /// Strokes on holes 16 to 18.
    pub last3: Option<u32>,
    /// Strokes on hole 18.
    pub last1: Option<u32>,
}

impl TieBreak {
    fn from_holes(holes: &[(HoleNumber, Strokes)]) -> Self {
        let from = |first: u8| {
            let recorded: Vec<u32> = holes
                .iter()
                .filter(|(hole, _)| hole.get() >= first)
                .map(|(_, strokes)| u32::from(strokes.get()))
                .collect();
            (!recorded.is_empty()).then(|| recorded.iter().sum::<u32>())
        };

        Self {
            last9: from(10),
            last6: from(13),
            last3: from(16),
            last1: from(18),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        missing_last(self.last9, other.last9)
            .then_with(|| missing_last(self.last6, other.last6))
            .then_with(|| missing_last(self.last3, other.last3))
            .then_with(|| missing_last(self.last1, other.last1))
    }
}

/// Computed leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    /// 1-based rank; tied players share it.
    pub rank: usize,
    /// Player identifier.
    pub player_id: Uuid,
    /// Display name.
    pub name: String,
    /// Category the player competes in, if any.
    pub category: Option<String>,
    /// Handicap used for the net total (missing means scratch).
    pub course_handicap: Option<CourseHandicap>,
    /// Gross strokes, absent before the first recorded hole.
    pub total_strokes: Option<u32>,
    /// Number of holes with a recorded score.
    pub through: usize,
    /// Gross strokes against par of the holes actually played.
    pub to_par: Option<i32>,
    /// Flat net total.
    pub net_score: Option<i32>,
    /// Sub-totals for tie resolution.
    pub tie_break: TieBreak,
}

impl Standing {
    fn from_round(round: PlayerRound, pars: &[Par; HOLES_PER_ROUND]) -> Self {
        let through = round.holes.len();
        let (total, par_played) =
            round
                .holes
                .iter()
                .fold((0u32, 0u32), |(total, par), (hole, strokes)| {
                    (
                        total + u32::from(strokes.get()),
                        par + u32::from(pars[hole.index()].get()),
                    )
                });
        let total_strokes = (through > 0).then_some(total);

        Self {
            rank: 0,
            player_id: round.player_id,
            name: round.name,
            category: round.category,
            course_handicap: round.course_handicap,
            total_strokes,
            through,
            to_par: total_strokes.map(|total| total as i32 - par_played as i32),
            net_score: total_strokes.map(|total| net_total(total, round.course_handicap)),
            tie_break: TieBreak::from_holes(&round.holes),
        }
    }

    fn primary(&self, view: LeaderboardView) -> Option<i32> {
        match view {
            LeaderboardView::Net => self.net_score,
            LeaderboardView::Gross => self.total_strokes.map(|total| total as i32),
        }
    }

    fn cmp_in(&self, other: &Self, view: LeaderboardView) -> Ordering {
        missing_last(self.primary(view), other.primary(view))
            .then_with(|| self.tie_break.compare(&other.tie_break))
    }
}

/// Rank every round. Returns an empty board when nobody has a recorded hole.
pub fn rank(
    rounds: impl IntoIterator<Item = PlayerRound>,
    pars: &[Par; HOLES_PER_ROUND],
    view: LeaderboardView,
) -> Vec<Standing> {
    let mut standings: Vec<Standing> = rounds
        .into_iter()
        .map(|round| Standing::from_round(round, pars))
        .collect();

    if standings.iter().all(|standing| standing.through == 0) {
        return Vec::new();
    }

    standings.sort_by(|a, b| a.cmp_in(b, view));

    for index in 0..standings.len() {
        let rank = match index.checked_sub(1) {
            Some(previous)
                if standings[previous].cmp_in(&standings[index], view) == Ordering::Equal =>
            {
                standings[previous].rank
            }
            _ => index + 1,
        };
        standings[index].rank = rank;
    }

    standings
}

/// Independent boards per category, ordered as `categories` then by first appearance.
///
/// Players without a category only appear on the overall board.
pub fn rank_by_category(
    rounds: impl IntoIterator<Item = PlayerRound>,
    categories: &[String],
    pars: &[Par; HOLES_PER_ROUND],
    view: LeaderboardView,
) -> IndexMap<String, Vec<Standing>> {
    let mut grouped: IndexMap<String, Vec<PlayerRound>> = categories
        .iter()
        .map(|name| (name.clone(), Vec::new()))
        .collect();

    for round in rounds {
        if let Some(category) = round.category.clone() {
            grouped.entry(category).or_default().push(round);
        }
    }

    grouped
        .into_iter()
        .map(|(category, rounds)| (category, rank(rounds, pars, view)))
        .collect()
}

fn missing_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
