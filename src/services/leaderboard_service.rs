//! Read-only projections over every group of a tournament.

use std::{collections::HashMap, sync::Arc};

use tracing::debug;
use uuid::Uuid;

use crate::{
    dao::{
        models::{CourseEntity, TournamentEntity},
        tournament_store::TournamentStore,
    },
    dto::leaderboard::{
        HoleHistoryRow, LeaderboardQuery, LeaderboardResponse, PlayerHistoryResponse, StandingDto,
    },
    error::ServiceError,
    scoring::{
        course::CourseLayout,
        handicap::{net_for_hole, net_total},
        leaderboard::{PlayerRound, rank, rank_by_category},
        values::{CourseHandicap, HoleNumber},
    },
    state::{
        SharedState,
        round::{GroupRound, course_layout, member_handicap},
    },
};

async fn load_tournament(
    store: &Arc<dyn TournamentStore>,
    tournament_id: Uuid,
) -> Result<(TournamentEntity, CourseEntity, CourseLayout), ServiceError> {
    let tournament = store
        .find_tournament(tournament_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("tournament `{tournament_id}` not found")))?;
    let course = store
        .find_course(tournament.course_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("course `{}` not found", tournament.course_id))
        })?;
    let layout = course_layout(&course)?;
    Ok((tournament, course, layout))
}

async fn load_rounds(
    store: &Arc<dyn TournamentStore>,
    tournament_id: Uuid,
) -> Result<Vec<GroupRound>, ServiceError> {
    store
        .list_groups(tournament_id)
        .await?
        .into_iter()
        .map(GroupRound::try_from)
        .collect()
}

/// Rank every player of the tournament, overall and per category.
///
/// A tournament where nobody has recorded a score yields empty boards.
pub async fn get_leaderboard(
    state: &SharedState,
    tournament_id: Uuid,
    query: LeaderboardQuery,
) -> Result<LeaderboardResponse, ServiceError> {
    let store = state.require_store().await?;
    let (tournament, _, layout) = load_tournament(&store, tournament_id).await?;
    let rounds = load_rounds(&store, tournament_id).await?;
    let member_ids: Vec<Uuid> = rounds
        .iter()
        .flat_map(|round| round.members().iter().map(|member| member.player_id))
        .collect();
    let names: HashMap<Uuid, String> = store
        .find_players(member_ids)
        .await?
        .into_iter()
        .map(|player| (player.id, player.name))
        .collect();

    let players: Vec<PlayerRound> = rounds
        .iter()
        .flat_map(|round| {
            round.members().iter().map(|member| PlayerRound {
                player_id: member.player_id,
                name: names
                    .get(&member.player_id)
                    .cloned()
                    .unwrap_or_else(|| member.player_id.to_string()),
                category: member.category.clone(),
                course_handicap: member_handicap(member),
                holes: round.card().player_holes(member.player_id),
            })
        })
        .collect();

    let view = query.view.unwrap_or_default();
    let pars = layout.pars();
    let mut categories = rank_by_category(players.clone(), &tournament.categories, &pars, view);

    let overall = match &query.category {
        Some(category) => {
            categories.retain(|name, _| name == category);
            categories.get(category).cloned().unwrap_or_default()
        }
        None => rank(players, &pars, view),
    };

    debug!(
        %tournament_id,
        ?view,
        ranked = overall.len(),
        groups = rounds.len(),
        "leaderboard computed"
    );

    Ok(LeaderboardResponse {
        tournament_id,
        tournament_name: tournament.name,
        view,
        players: overall.into_iter().map(StandingDto::from).collect(),
        categories: categories
            .into_iter()
            .map(|(name, standings)| {
                (
                    name,
                    standings.into_iter().map(StandingDto::from).collect(),
                )
            })
            .collect(),
    })
}

/// Hole-by-hole detail of one player's round in official hole order.
pub async fn get_player_history(
    state: &SharedState,
    tournament_id: Uuid,
    player_id: Uuid,
) -> Result<PlayerHistoryResponse, ServiceError> {
    let store = state.require_store().await?;
    let (_, course, layout) = load_tournament(&store, tournament_id).await?;
    let rounds = load_rounds(&store, tournament_id).await?;

    let Some((round, member)) = rounds.iter().find_map(|round| {
        round
            .member(player_id)
            .map(|member| (round, member.clone()))
    }) else {
        return Err(ServiceError::NotFound(format!(
            "player `{player_id}` is not playing tournament `{tournament_id}`"
        )));
    };

    let name = store
        .find_player(player_id)
        .await?
        .map(|player| player.name)
        .unwrap_or_else(|| player_id.to_string());
    let handicap = member_handicap(&member);
    let policy = state.config().handicap_allocation();

    let holes: Vec<HoleHistoryRow> = HoleNumber::all()
        .map(|hole| {
            let spec = layout.hole(hole);
            let strokes = round.card().strokes(player_id, hole);
            let yardage = course
                .holes
                .iter()
                .find(|entity| entity.number == hole.get())
                .and_then(|entity| {
                    entity
                        .tees
                        .iter()
                        .find(|tee| tee.color.eq_ignore_ascii_case(&member.tee_color))
                })
                .map(|tee| tee.yardage);
            HoleHistoryRow {
                hole: hole.get(),
                par: spec.par.get(),
                stroke_index: spec.stroke_index.map(|index| index.get()),
                yardage,
                strokes: strokes.map(|value| value.get()),
                net_strokes: strokes.and_then(|gross| {
                    net_for_hole(
                        gross,
                        handicap.unwrap_or(CourseHandicap::ZERO),
                        spec.stroke_index,
                        policy,
                    )
                }),
            }
        })
        .collect();

    let recorded: Vec<u32> = holes
        .iter()
        .filter_map(|row| row.strokes.map(u32::from))
        .collect();
    let total_strokes = (!recorded.is_empty()).then(|| recorded.iter().sum::<u32>());

    Ok(PlayerHistoryResponse {
        tournament_id,
        player_id,
        name,
        tee_color: member.tee_color,
        course_handicap: member.course_handicap,
        total_strokes,
        net_score: total_strokes.map(|total| net_total(total, handicap)),
        holes,
    })
}
