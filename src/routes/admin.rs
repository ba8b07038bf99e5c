use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::admin::{
        CourseSummary, CreateCourseRequest, CreateGroupRequest, CreateTournamentRequest,
        GroupSummary, PlayerSummary, RegisterPlayerRequest, TournamentSummary,
        UpdateTournamentStatusRequest,
    },
    error::AppError,
    services::admin_service,
    state::SharedState,
};

/// Admin management endpoints for courses, tournaments, players and groups.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/admin/courses", get(list_courses).post(create_course))
        .route("/admin/courses/{id}", get(get_course).delete(delete_course))
        .route("/admin/courses/{id}/finalize", post(finalize_course))
        .route(
            "/admin/tournaments",
            get(list_tournaments).post(create_tournament),
        )
        .route(
            "/admin/tournaments/{id}",
            get(get_tournament).delete(delete_tournament),
        )
        .route(
            "/admin/tournaments/{id}/status",
            put(update_tournament_status),
        )
        .route("/admin/tournaments/{id}/groups", get(list_groups))
        .route("/admin/players", get(list_players).post(register_player))
        .route("/admin/players/{id}", get(get_player))
        .route("/admin/groups", post(create_group))
        .route("/admin/groups/{id}", get(get_group).delete(delete_group))
        .route("/admin/groups/by-code/{code}", get(find_group_by_code))
}

#[utoipa::path(
    get,
    path = "/admin/courses",
    tag = "admin",
    responses((status = 200, description = "Known courses", body = [CourseSummary]))
)]
pub async fn list_courses(
    State(state): State<SharedState>,
) -> Result<Json<Vec<CourseSummary>>, AppError> {
    Ok(Json(admin_service::list_courses(&state).await?))
}

#[utoipa::path(
    post,
    path = "/admin/courses",
    tag = "admin",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = CourseSummary),
        (status = 400, description = "Holes are not 18 distinct valid holes")
    )
)]
pub async fn create_course(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateCourseRequest>>,
) -> Result<(StatusCode, Json<CourseSummary>), AppError> {
    let course = admin_service::create_course(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

#[utoipa::path(
    get,
    path = "/admin/courses/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Course identifier")),
    responses(
        (status = 200, description = "Course", body = CourseSummary),
        (status = 404, description = "Course not found")
    )
)]
pub async fn get_course(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CourseSummary>, AppError> {
    Ok(Json(admin_service::get_course(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/admin/courses/{id}/finalize",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Course identifier")),
    responses(
        (status = 200, description = "Course finalized", body = CourseSummary),
        (status = 400, description = "Stroke indexes missing or not a permutation of 1-18"),
        (status = 404, description = "Course not found")
    )
)]
/// Validate stroke indexes and lock the course layout in.
pub async fn finalize_course(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CourseSummary>, AppError> {
    Ok(Json(admin_service::finalize_course(&state, id).await?))
}

#[utoipa::path(
    delete,
    path = "/admin/courses/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Course identifier")),
    responses(
        (status = 204, description = "Course and its tournaments deleted"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn delete_course(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    admin_service::delete_course(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/admin/tournaments",
    tag = "admin",
    responses((status = 200, description = "Known tournaments", body = [TournamentSummary]))
)]
pub async fn list_tournaments(
    State(state): State<SharedState>,
) -> Result<Json<Vec<TournamentSummary>>, AppError> {
    Ok(Json(admin_service::list_tournaments(&state).await?))
}

#[utoipa::path(
    post,
    path = "/admin/tournaments",
    tag = "admin",
    request_body = CreateTournamentRequest,
    responses(
        (status = 201, description = "Tournament scheduled", body = TournamentSummary),
        (status = 404, description = "Course not found"),
        (status = 409, description = "Course not finalized")
    )
)]
pub async fn create_tournament(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateTournamentRequest>>,
) -> Result<(StatusCode, Json<TournamentSummary>), AppError> {
    let tournament = admin_service::create_tournament(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(tournament)))
}

#[utoipa::path(
    get,
    path = "/admin/tournaments/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Tournament identifier")),
    responses(
        (status = 200, description = "Tournament", body = TournamentSummary),
        (status = 404, description = "Tournament not found")
    )
)]
pub async fn get_tournament(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TournamentSummary>, AppError> {
    Ok(Json(admin_service::get_tournament(&state, id).await?))
}

#[utoipa::path(
    put,
    path = "/admin/tournaments/{id}/status",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Tournament identifier")),
    request_body = UpdateTournamentStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = TournamentSummary),
        (status = 404, description = "Tournament not found")
    )
)]
pub async fn update_tournament_status(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTournamentStatusRequest>,
) -> Result<Json<TournamentSummary>, AppError> {
    Ok(Json(
        admin_service::update_tournament_status(&state, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/admin/tournaments/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Tournament identifier")),
    responses(
        (status = 204, description = "Tournament and its groups deleted"),
        (status = 404, description = "Tournament not found")
    )
)]
pub async fn delete_tournament(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    admin_service::delete_tournament(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/admin/tournaments/{id}/groups",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Tournament identifier")),
    responses(
        (status = 200, description = "Groups of the tournament", body = [GroupSummary]),
        (status = 404, description = "Tournament not found")
    )
)]
pub async fn list_groups(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<GroupSummary>>, AppError> {
    Ok(Json(admin_service::list_groups(&state, id).await?))
}

#[utoipa::path(
    get,
    path = "/admin/players",
    tag = "admin",
    responses((status = 200, description = "Registered players", body = [PlayerSummary]))
)]
pub async fn list_players(
    State(state): State<SharedState>,
) -> Result<Json<Vec<PlayerSummary>>, AppError> {
    Ok(Json(admin_service::list_players(&state).await?))
}

#[utoipa::path(
    post,
    path = "/admin/players",
    tag = "admin",
    request_body = RegisterPlayerRequest,
    responses((status = 201, description = "Player registered", body = PlayerSummary))
)]
pub async fn register_player(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<RegisterPlayerRequest>>,
) -> Result<(StatusCode, Json<PlayerSummary>), AppError> {
    let player = admin_service::register_player(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(player)))
}

#[utoipa::path(
    get,
    path = "/admin/players/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Player identifier")),
    responses(
        (status = 200, description = "Player", body = PlayerSummary),
        (status = 404, description = "Player not found")
    )
)]
pub async fn get_player(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PlayerSummary>, AppError> {
    Ok(Json(admin_service::get_player(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/admin/groups",
    tag = "admin",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created with its access code", body = GroupSummary),
        (status = 400, description = "Invalid members or start hole"),
        (status = 404, description = "Tournament or player not found"),
        (status = 409, description = "A player already plays in another group")
    )
)]
pub async fn create_group(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateGroupRequest>>,
) -> Result<(StatusCode, Json<GroupSummary>), AppError> {
    let group = admin_service::create_group(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

#[utoipa::path(
    get,
    path = "/admin/groups/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Group identifier")),
    responses(
        (status = 200, description = "Group", body = GroupSummary),
        (status = 404, description = "Group not found")
    )
)]
pub async fn get_group(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GroupSummary>, AppError> {
    Ok(Json(admin_service::get_group(&state, id).await?))
}

#[utoipa::path(
    get,
    path = "/admin/groups/by-code/{code}",
    tag = "admin",
    params(("code" = String, Path, description = "Scorer access code")),
    responses(
        (status = 200, description = "Group", body = GroupSummary),
        (status = 404, description = "Code not found")
    )
)]
pub async fn find_group_by_code(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<GroupSummary>, AppError> {
    Ok(Json(admin_service::find_group_by_code(&state, &code).await?))
}

#[utoipa::path(
    delete,
    path = "/admin/groups/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Group identifier")),
    responses(
        (status = 204, description = "Group and its scores deleted"),
        (status = 404, description = "Group not found")
    )
)]
pub async fn delete_group(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    admin_service::delete_group(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
