//! Fixtures shared by the service tests.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::tournament_store::memory::MemoryTournamentStore,
    dto::{
        admin::{
            CreateCourseRequest, CreateGroupRequest, CreateTournamentRequest, GroupMemberInput,
            HoleInput, RegisterPlayerRequest, TeeInput,
        },
        common::EventKindDto,
        scorecard::{PlayerStrokesInput, SubmitHoleScoresRequest},
    },
    services::admin_service,
    state::{AppState, SharedState},
};

/// Par of holes 1 to 18; adds up to 72.
pub const PARS: [u8; 18] = [4, 4, 3, 5, 4, 4, 3, 4, 5, 4, 4, 3, 5, 4, 4, 3, 4, 5];

/// State backed by a fresh in-memory store.
pub async fn memory_state() -> SharedState {
    let state = AppState::new(AppConfig::default());
    state
        .install_store(Arc::new(MemoryTournamentStore::new()))
        .await;
    state
}

/// Stroke index of hole `number`; a permutation of 1..18.
pub fn stroke_index(number: u8) -> u8 {
    (number * 7) % 18 + 1
}

pub fn course_request(with_stroke_index: bool) -> CreateCourseRequest {
    CreateCourseRequest {
        name: "Les Bruyères".into(),
        holes: (1..=18u8)
            .rev()
            .map(|number| HoleInput {
                number,
                par: PARS[usize::from(number) - 1],
                stroke_index: with_stroke_index.then(|| stroke_index(number)),
                tees: vec![
                    TeeInput {
                        color: "white".into(),
                        yardage: 300 + u32::from(number),
                    },
                    TeeInput {
                        color: "yellow".into(),
                        yardage: 280 + u32::from(number),
                    },
                ],
                image_url: None,
            })
            .collect(),
    }
}

/// A scheduled tournament with one group ready to score.
pub struct Seeded {
    pub tournament_id: Uuid,
    pub group_id: Uuid,
    pub access_code: String,
    pub players: Vec<Uuid>,
}

pub async fn seed_tournament(state: &SharedState, categories: &[&str]) -> Uuid {
    let course = admin_service::create_course(state, course_request(true))
        .await
        .unwrap();
    admin_service::finalize_course(state, course.id)
        .await
        .unwrap();
    admin_service::create_tournament(
        state,
        CreateTournamentRequest {
            name: "Spring Cup".into(),
            date: "2026-04-18".into(),
            course_id: course.id,
            kind: EventKindDto::Tournament,
            categories: categories.iter().map(|c| c.to_string()).collect(),
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn register(state: &SharedState, name: &str) -> Uuid {
    admin_service::register_player(
        state,
        RegisterPlayerRequest {
            name: name.into(),
            email: None,
        },
    )
    .await
    .unwrap()
    .id
}

/// Group members as `(player, course handicap, category)`.
pub async fn seed_group(
    state: &SharedState,
    tournament_id: Uuid,
    start_hole: u8,
    members: &[(Uuid, Option<u8>, Option<&str>)],
) -> Seeded {
    let group = admin_service::create_group(
        state,
        CreateGroupRequest {
            tournament_id,
            start_hole,
            members: members
                .iter()
                .map(|(player_id, course_handicap, category)| GroupMemberInput {
                    player_id: *player_id,
                    course_handicap: *course_handicap,
                    tee_color: "white".into(),
                    category: category.map(str::to_string),
                })
                .collect(),
        },
    )
    .await
    .unwrap();

    Seeded {
        tournament_id,
        group_id: group.id,
        access_code: group.access_code,
        players: members.iter().map(|(player_id, _, _)| *player_id).collect(),
    }
}

/// Tournament with one two-player group; the first player carries a handicap of 10.
pub async fn seed_pair(state: &SharedState, start_hole: u8) -> Seeded {
    let tournament_id = seed_tournament(state, &[]).await;
    let alice = register(state, "Alice").await;
    let bruno = register(state, "Bruno").await;
    seed_group(
        state,
        tournament_id,
        start_hole,
        &[(alice, Some(10), None), (bruno, None, None)],
    )
    .await
}

pub fn scores(entries: &[(Uuid, i64)]) -> SubmitHoleScoresRequest {
    SubmitHoleScoresRequest {
        scores: entries
            .iter()
            .map(|(player_id, strokes)| PlayerStrokesInput {
                player_id: *player_id,
                strokes: *strokes,
            })
            .collect(),
        expected_version: None,
    }
}
