use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::leaderboard::{LeaderboardQuery, LeaderboardResponse, PlayerHistoryResponse},
    error::AppError,
    services::leaderboard_service,
    state::SharedState,
};

/// Read-only tournament standings.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/tournaments/{id}/leaderboard", get(get_leaderboard))
        .route(
            "/tournaments/{id}/players/{player_id}/history",
            get(get_player_history),
        )
}

#[utoipa::path(
    get,
    path = "/tournaments/{id}/leaderboard",
    tag = "leaderboard",
    params(("id" = Uuid, Path, description = "Tournament identifier"), LeaderboardQuery),
    responses(
        (status = 200, description = "Ranked players; empty before the first score", body = LeaderboardResponse),
        (status = 404, description = "Tournament not found")
    )
)]
/// Rank the players of a tournament.
pub async fn get_leaderboard(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    Ok(Json(
        leaderboard_service::get_leaderboard(&state, id, query).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/tournaments/{id}/players/{player_id}/history",
    tag = "leaderboard",
    params(
        ("id" = Uuid, Path, description = "Tournament identifier"),
        ("player_id" = Uuid, Path, description = "Player identifier")
    ),
    responses(
        (status = 200, description = "Hole-by-hole detail", body = PlayerHistoryResponse),
        (status = 404, description = "Tournament not found or player not entered")
    )
)]
/// Hole-by-hole strokes, par and yardage of one player.
pub async fn get_player_history(
    State(state): State<SharedState>,
    Path((id, player_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<PlayerHistoryResponse>, AppError> {
    Ok(Json(
        leaderboard_service::get_player_history(&state, id, player_id).await?,
    ))
}
