use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::scorecard::{
        GroupStatusResponse, ScorecardQuery, ScorecardResponse, StepQuery, StepView,
        SubmitHoleScoresRequest, SubmitHoleScoresResponse,
    },
    error::AppError,
    services::scorecard_service,
    state::SharedState,
};

/// Scorer endpoints: opening a card, wizard navigation and hole confirmation.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/scorecards/{access_code}", get(get_scorecard))
        .route("/scorecards/{access_code}/steps/{step}", get(view_step))
        .route("/groups/{id}/holes/{hole}", post(submit_hole_scores))
        .route("/groups/{id}/finish", post(finish_group))
        .route("/groups/{id}/reopen", post(reopen_group))
}

#[utoipa::path(
    get,
    path = "/scorecards/{access_code}",
    tag = "scorecard",
    params(
        ("access_code" = String, Path, description = "Code handed to the group's scorer"),
        ScorecardQuery
    ),
    responses(
        (status = 200, description = "Scorecard snapshot", body = ScorecardResponse),
        (status = 400, description = "Malformed access code"),
        (status = 404, description = "Code not found")
    )
)]
/// Open the scorecard behind an access code.
pub async fn get_scorecard(
    State(state): State<SharedState>,
    Path(access_code): Path<String>,
    Query(query): Query<ScorecardQuery>,
) -> Result<Json<ScorecardResponse>, AppError> {
    let card = scorecard_service::get_scorecard(&state, &access_code, query.player_id).await?;
    Ok(Json(card))
}

#[utoipa::path(
    get,
    path = "/scorecards/{access_code}/steps/{step}",
    tag = "scorecard",
    params(
        ("access_code" = String, Path, description = "Code handed to the group's scorer"),
        ("step" = usize, Path, description = "Position in the play order (0 = first hole played)"),
        StepQuery
    ),
    responses(
        (status = 200, description = "Hole shown by the wizard", body = StepView),
        (status = 404, description = "Code not found"),
        (status = 409, description = "Review mode requested on a card that is not re-opened")
    )
)]
/// Navigate the wizard; steps beyond what the card allows are clamped.
pub async fn view_step(
    State(state): State<SharedState>,
    Path((access_code, step)): Path<(String, usize)>,
    Query(query): Query<StepQuery>,
) -> Result<Json<StepView>, AppError> {
    let view = scorecard_service::view_step(&state, &access_code, step, query.editing).await?;
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/groups/{id}/holes/{hole}",
    tag = "scorecard",
    params(
        ("id" = Uuid, Path, description = "Group identifier"),
        ("hole" = u8, Path, description = "Official hole number (1-18)")
    ),
    request_body = SubmitHoleScoresRequest,
    responses(
        (status = 200, description = "Hole confirmed", body = SubmitHoleScoresResponse),
        (status = 400, description = "Incomplete hole, hole out of range or invalid strokes"),
        (status = 404, description = "Group not found"),
        (status = 409, description = "Hole already confirmed with different scores, or stale version"),
        (status = 503, description = "Storage unavailable; safe to retry")
    )
)]
/// Confirm one hole for every member of the group.
pub async fn submit_hole_scores(
    State(state): State<SharedState>,
    Path((id, hole)): Path<(Uuid, u8)>,
    Valid(Json(payload)): Valid<Json<SubmitHoleScoresRequest>>,
) -> Result<Json<SubmitHoleScoresResponse>, AppError> {
    let response = scorecard_service::submit_hole_scores(&state, id, hole, payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/groups/{id}/finish",
    tag = "scorecard",
    params(("id" = Uuid, Path, description = "Group identifier")),
    responses(
        (status = 200, description = "Card completed", body = GroupStatusResponse),
        (status = 404, description = "Group not found"),
        (status = 409, description = "Some holes are not confirmed yet")
    )
)]
/// Mark the group's card as completed.
pub async fn finish_group(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GroupStatusResponse>, AppError> {
    Ok(Json(scorecard_service::finish_group(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/groups/{id}/reopen",
    tag = "scorecard",
    params(("id" = Uuid, Path, description = "Group identifier")),
    responses(
        (status = 200, description = "Card re-opened for review", body = GroupStatusResponse),
        (status = 404, description = "Group not found"),
        (status = 409, description = "Card is not completed")
    )
)]
/// Re-open a completed card so every hole can be corrected.
pub async fn reopen_group(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GroupStatusResponse>, AppError> {
    Ok(Json(scorecard_service::reopen_group(&state, id).await?))
}
