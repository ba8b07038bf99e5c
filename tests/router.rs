//! End-to-end checks of the HTTP surface over the in-memory store.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use birdify_back::{
    config::AppConfig,
    dao::tournament_store::memory::MemoryTournamentStore,
    routes,
    state::{AppState, SharedState},
};

const PARS: [u64; 18] = [4, 4, 3, 5, 4, 4, 3, 4, 5, 4, 4, 3, 5, 4, 4, 3, 4, 5];

async fn app() -> (Router, SharedState) {
    let state = AppState::new(AppConfig::default());
    state
        .install_store(Arc::new(MemoryTournamentStore::new()))
        .await;
    (routes::router(state.clone()), state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}

/// Course, tournament and a two-player group teeing off at `start_hole`.
/// Returns `(tournament_id, group_id, access_code, [alice, bruno])`.
async fn seed(app: &Router, start_hole: u8) -> (String, String, String, [String; 2]) {
    let holes: Vec<Value> = (1..=18u64)
        .map(|number| {
            json!({
                "number": number,
                "par": PARS[(number - 1) as usize],
                "stroke_index": (number * 7) % 18 + 1,
                "tees": [{ "color": "white", "yardage": 300 + number }],
            })
        })
        .collect();
    let (status, course) = send(
        app,
        Method::POST,
        "/admin/courses",
        Some(json!({ "name": "Les Bruyères", "holes": holes })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let course_id = id_of(&course);

    let (status, _) = send(
        app,
        Method::POST,
        &format!("/admin/courses/{course_id}/finalize"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, tournament) = send(
        app,
        Method::POST,
        "/admin/tournaments",
        Some(json!({ "name": "Spring Cup", "date": "2026-04-18", "course_id": course_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let tournament_id = id_of(&tournament);

    let mut players = Vec::new();
    for name in ["Alice", "Bruno"] {
        let (status, player) = send(
            app,
            Method::POST,
            "/admin/players",
            Some(json!({ "name": name })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        players.push(id_of(&player));
    }

    let (status, group) = send(
        app,
        Method::POST,
        "/admin/groups",
        Some(json!({
            "tournament_id": tournament_id,
            "start_hole": start_hole,
            "members": [
                { "player_id": players[0], "course_handicap": 10, "tee_color": "white" },
                { "player_id": players[1], "tee_color": "white" },
            ],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    (
        tournament_id,
        id_of(&group),
        group["access_code"].as_str().unwrap().to_string(),
        [players[0].clone(), players[1].clone()],
    )
}

#[tokio::test]
async fn healthcheck_reports_ok() {
    let (app, _) = app().await;
    let (status, body) = send(&app, Method::GET, "/healthcheck", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn requests_fail_with_503_without_a_store() {
    let state = AppState::new(AppConfig::default());
    let app = routes::router(state);
    let (status, body) = send(&app, Method::GET, "/scorecards/ABCDEF", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn unknown_access_code_is_not_found() {
    let (app, _) = app().await;
    let (status, body) = send(&app, Method::GET, "/scorecards/0000", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "not found: code not found");

    let (status, _) = send(&app, Method::GET, "/scorecards/a!", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn incomplete_hole_lists_missing_players() {
    let (app, _) = app().await;
    let (_, group_id, access_code, [alice, bruno]) = seed(&app, 10).await;

    let (status, card) = send(&app, Method::GET, &format!("/scorecards/{access_code}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(card["sequence"][0], 10);
    assert_eq!(card["progress"]["current_hole"], 10);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/groups/{group_id}/holes/10"),
        Some(json!({ "scores": [{ "player_id": alice, "strokes": 4 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["missing_players"], json!([bruno]));
}

#[tokio::test]
async fn confirmed_hole_advances_and_shows_on_the_leaderboard() {
    let (app, _) = app().await;
    let (tournament_id, group_id, access_code, [alice, bruno]) = seed(&app, 1).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/groups/{group_id}/holes/1"),
        Some(json!({
            "scores": [
                { "player_id": alice, "strokes": 5 },
                { "player_id": bruno, "strokes": 4 },
            ],
            "expected_version": 0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "advanced");
    assert_eq!(body["progress"]["current_hole"], 2);
    assert_eq!(body["progress"]["version"], 1);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/groups/{group_id}/holes/5"),
        Some(json!({ "scores": [{ "player_id": alice, "strokes": 4 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/groups/{group_id}/holes/1"),
        Some(json!({
            "scores": [{ "player_id": alice, "strokes": 5 }],
            "expected_version": 0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, step) = send(
        &app,
        Method::GET,
        &format!("/scorecards/{access_code}/steps/9"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(step["step"], 1);
    assert_eq!(step["hole"]["hole"], 2);

    let (status, board) = send(
        &app,
        Method::GET,
        &format!("/tournaments/{tournament_id}/leaderboard?view=gross"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["view"], "gross");
    assert_eq!(board["players"][0]["player_id"], json!(bruno));
    assert_eq!(board["players"][0]["through"], 1);

    let (status, history) = send(
        &app,
        Method::GET,
        &format!("/tournaments/{tournament_id}/players/{alice}/history"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["holes"].as_array().map(Vec::len), Some(18));
    assert_eq!(history["holes"][0]["net_strokes"], 4);
}

#[tokio::test]
async fn finishing_an_unfinished_card_is_a_conflict() {
    let (app, _) = app().await;
    let (_, group_id, _, _) = seed(&app, 1).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/groups/{group_id}/finish"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("current hole 1"));
}

#[tokio::test]
async fn leaderboard_of_a_fresh_tournament_is_empty() {
    let (app, _) = app().await;
    let (tournament_id, _, _, _) = seed(&app, 1).await;

    let (status, board) = send(
        &app,
        Method::GET,
        &format!("/tournaments/{tournament_id}/leaderboard"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["players"], json!([]));
}
