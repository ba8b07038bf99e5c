use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Birdify Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::scorecard::get_scorecard,
        crate::routes::scorecard::view_step,
        crate::routes::scorecard::submit_hole_scores,
        crate::routes::scorecard::finish_group,
        crate::routes::scorecard::reopen_group,
        crate::routes::leaderboard::get_leaderboard,
        crate::routes::leaderboard::get_player_history,
        crate::routes::admin::list_courses,
        crate::routes::admin::create_course,
        crate::routes::admin::get_course,
        crate::routes::admin::finalize_course,
        crate::routes::admin::delete_course,
        crate::routes::admin::list_tournaments,
        crate::routes::admin::create_tournament,
        crate::routes::admin::get_tournament,
        crate::routes::admin::update_tournament_status,
        crate::routes::admin::delete_tournament,
        crate::routes::admin::list_groups,
        crate::routes::admin::list_players,
        crate::routes::admin::register_player,
        crate::routes::admin::get_player,
        crate::routes::admin::create_group,
        crate::routes::admin::get_group,
        crate::routes::admin::find_group_by_code,
        crate::routes::admin::delete_group,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::GroupProgressEvent,
            crate::dto::sse::LeaderboardUpdatedEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "scorecard", description = "Hole-by-hole score entry for a group"),
        (name = "leaderboard", description = "Tournament standings and player history"),
        (name = "admin", description = "Courses, tournaments, players and groups"),
    )
)]
pub struct ApiDoc;

/// OpenAPI document stamped with the crate version.
pub fn api_doc() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = "Birdify Back".into();
    doc.info.version = env!("CARGO_PKG_VERSION").into();
    doc
}
