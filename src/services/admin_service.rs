//! Business logic powering the admin REST routes: courses, tournaments, players
//! and groups. Group deletion takes the group lock so it never interleaves with
//! a scorer's transaction.

use std::{collections::HashSet, sync::Arc, time::SystemTime};

use rand::{Rng, rng};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dao::{
        models::{
            CourseEntity, GroupEntity, GroupMemberEntity, GroupStatusEntity, HoleEntity,
            PlayerEntity, TeeEntity, TournamentEntity, TournamentStatusEntity,
        },
        storage::StorageError,
        tournament_store::TournamentStore,
    },
    dto::admin::{
        CourseSummary, CreateCourseRequest, CreateGroupRequest, CreateTournamentRequest,
        GroupSummary, PlayerSummary, RegisterPlayerRequest, TournamentSummary,
        UpdateTournamentStatusRequest,
    },
    error::ServiceError,
    scoring::{
        course::{CourseLayout, HoleSpec},
        values::{HoleNumber, Par, StrokeIndex, ValueError},
    },
    state::{
        SharedState,
        round::{GroupRound, course_layout},
    },
};

/// Characters used in generated access codes; look-alikes (0/O, 1/I) are left out.
const ACCESS_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const MAX_ACCESS_CODE_ATTEMPTS: usize = 8;

fn generate_access_code(length: usize) -> String {
    let mut rng = rng();
    (0..length)
        .map(|_| {
            let index = rng.random_range(0..ACCESS_CODE_ALPHABET.len());
            char::from(ACCESS_CODE_ALPHABET[index])
        })
        .collect()
}

async fn require_course(
    store: &Arc<dyn TournamentStore>,
    id: Uuid,
) -> Result<CourseEntity, ServiceError> {
    store
        .find_course(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("course `{id}` not found")))
}

async fn require_tournament(
    store: &Arc<dyn TournamentStore>,
    id: Uuid,
) -> Result<TournamentEntity, ServiceError> {
    store
        .find_tournament(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("tournament `{id}` not found")))
}

async fn require_group(
    store: &Arc<dyn TournamentStore>,
    id: Uuid,
) -> Result<GroupRound, ServiceError> {
    let group = store
        .find_group(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("group `{id}` not found")))?;
    GroupRound::try_from(group)
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

/// Create a course from exactly 18 holes. Stroke indexes may still be missing.
pub async fn create_course(
    state: &SharedState,
    request: CreateCourseRequest,
) -> Result<CourseSummary, ServiceError> {
    let specs = request
        .holes
        .iter()
        .map(|hole| {
            Ok(HoleSpec {
                number: HoleNumber::try_from(hole.number)?,
                par: Par::try_from(hole.par)?,
                stroke_index: hole.stroke_index.map(StrokeIndex::try_from).transpose()?,
            })
        })
        .collect::<Result<Vec<_>, ValueError>>()?;
    CourseLayout::new(specs).map_err(|err| ServiceError::InvalidInput(err.to_string()))?;

    let mut holes: Vec<HoleEntity> = request
        .holes
        .into_iter()
        .map(|hole| HoleEntity {
            number: hole.number,
            par: hole.par,
            stroke_index: hole.stroke_index,
            tees: hole
                .tees
                .into_iter()
                .map(|tee| TeeEntity {
                    color: tee.color.trim().to_string(),
                    yardage: tee.yardage,
                })
                .collect(),
            image_url: hole.image_url,
        })
        .collect();
    holes.sort_by_key(|hole| hole.number);

    let course = CourseEntity {
        id: Uuid::new_v4(),
        name: request.name.trim().to_string(),
        holes,
        finalized: false,
        created_at: SystemTime::now(),
    };

    let store = state.require_store().await?;
    store.save_course(course.clone()).await?;
    info!(course_id = %course.id, name = %course.name, "course created");
    Ok(course.into())
}

pub async fn list_courses(state: &SharedState) -> Result<Vec<CourseSummary>, ServiceError> {
    let store = state.require_store().await?;
    Ok(store
        .list_courses()
        .await?
        .into_iter()
        .map(Into::into)
        .collect())
}

pub async fn get_course(state: &SharedState, id: Uuid) -> Result<CourseSummary, ServiceError> {
    let store = state.require_store().await?;
    Ok(require_course(&store, id).await?.into())
}

/// Check that stroke indexes form a permutation of 1..18 and lock the layout in.
pub async fn finalize_course(
    state: &SharedState,
    id: Uuid,
) -> Result<CourseSummary, ServiceError> {
    let store = state.require_store().await?;
    let course = require_course(&store, id).await?;
    if course.finalized {
        return Ok(course.into());
    }

    course_layout(&course)?
        .ensure_stroke_index_complete()
        .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;

    let course = CourseEntity {
        finalized: true,
        ..course
    };
    store.save_course(course.clone()).await?;
    info!(course_id = %id, "course finalized");
    Ok(course.into())
}

/// Delete a course with its tournaments, groups and scores.
pub async fn delete_course(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    let tournaments: Vec<Uuid> = store
        .list_tournaments()
        .await?
        .into_iter()
        .filter(|tournament| tournament.course_id == id)
        .map(|tournament| tournament.id)
        .collect();
    let mut group_ids = Vec::new();
    for tournament_id in &tournaments {
        group_ids.extend(
            store
                .list_groups(*tournament_id)
                .await?
                .into_iter()
                .map(|group| group.id),
        );
    }

    if !store.delete_course(id).await? {
        return Err(ServiceError::NotFound(format!("course `{id}` not found")));
    }
    for group_id in group_ids {
        state.forget_group(group_id);
    }
    for tournament_id in &tournaments {
        state.forget_tournament(*tournament_id);
    }
    info!(course_id = %id, tournaments = tournaments.len(), "course deleted");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tournaments
// ---------------------------------------------------------------------------

fn sanitize_categories(categories: Vec<String>) -> Result<Vec<String>, ServiceError> {
    let mut seen = HashSet::new();
    let mut cleaned = Vec::with_capacity(categories.len());
    for category in categories {
        let category = category.trim().to_string();
        if category.is_empty() {
            return Err(ServiceError::InvalidInput(
                "category names cannot be blank".into(),
            ));
        }
        if !seen.insert(category.to_lowercase()) {
            return Err(ServiceError::InvalidInput(format!(
                "duplicate category `{category}`"
            )));
        }
        cleaned.push(category);
    }
    Ok(cleaned)
}

/// Schedule a tournament on an existing course.
pub async fn create_tournament(
    state: &SharedState,
    request: CreateTournamentRequest,
) -> Result<TournamentSummary, ServiceError> {
    let store = state.require_store().await?;
    let course = require_course(&store, request.course_id).await?;
    if state.config().require_finalized_course() && !course.finalized {
        return Err(ServiceError::InvalidState(format!(
            "course `{}` must be finalized before scheduling a tournament",
            course.id
        )));
    }

    let tournament = TournamentEntity {
        id: Uuid::new_v4(),
        name: request.name.trim().to_string(),
        date: request.date,
        course_id: course.id,
        kind: request.kind.into(),
        status: TournamentStatusEntity::Scheduled,
        categories: sanitize_categories(request.categories)?,
        created_at: SystemTime::now(),
    };
    store.save_tournament(tournament.clone()).await?;
    info!(
        tournament_id = %tournament.id,
        course_id = %course.id,
        kind = ?tournament.kind,
        "tournament created"
    );
    Ok(tournament.into())
}

pub async fn list_tournaments(
    state: &SharedState,
) -> Result<Vec<TournamentSummary>, ServiceError> {
    let store = state.require_store().await?;
    Ok(store
        .list_tournaments()
        .await?
        .into_iter()
        .map(Into::into)
        .collect())
}

pub async fn get_tournament(
    state: &SharedState,
    id: Uuid,
) -> Result<TournamentSummary, ServiceError> {
    let store = state.require_store().await?;
    Ok(require_tournament(&store, id).await?.into())
}

pub async fn update_tournament_status(
    state: &SharedState,
    id: Uuid,
    request: UpdateTournamentStatusRequest,
) -> Result<TournamentSummary, ServiceError> {
    let store = state.require_store().await?;
    let tournament = require_tournament(&store, id).await?;
    let status: TournamentStatusEntity = request.status.into();
    if tournament.status == status {
        return Ok(tournament.into());
    }

    let updated = TournamentEntity {
        status,
        ..tournament
    };
    store.save_tournament(updated.clone()).await?;
    info!(tournament_id = %id, ?status, "tournament status updated");
    Ok(updated.into())
}

/// Delete a tournament with its groups and scores.
pub async fn delete_tournament(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    let group_ids: Vec<Uuid> = store
        .list_groups(id)
        .await?
        .into_iter()
        .map(|group| group.id)
        .collect();
    if !store.delete_tournament(id).await? {
        return Err(ServiceError::NotFound(format!("tournament `{id}` not found")));
    }
    for group_id in &group_ids {
        state.forget_group(*group_id);
    }
    state.forget_tournament(id);
    info!(tournament_id = %id, groups = group_ids.len(), "tournament deleted");
    Ok(())
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

pub async fn register_player(
    state: &SharedState,
    request: RegisterPlayerRequest,
) -> Result<PlayerSummary, ServiceError> {
    let store = state.require_store().await?;
    let player = PlayerEntity {
        id: Uuid::new_v4(),
        name: request.name.trim().to_string(),
        email: request.email.map(|email| email.trim().to_string()),
        created_at: SystemTime::now(),
    };
    store.save_player(player.clone()).await?;
    debug!(player_id = %player.id, "player registered");
    Ok(player.into())
}

pub async fn list_players(state: &SharedState) -> Result<Vec<PlayerSummary>, ServiceError> {
    let store = state.require_store().await?;
    Ok(store
        .list_players()
        .await?
        .into_iter()
        .map(Into::into)
        .collect())
}

pub async fn get_player(state: &SharedState, id: Uuid) -> Result<PlayerSummary, ServiceError> {
    let store = state.require_store().await?;
    store
        .find_player(id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ServiceError::NotFound(format!("player `{id}` not found")))
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

fn course_has_tee(course: &CourseEntity, color: &str) -> bool {
    let any_tees = course.holes.iter().any(|hole| !hole.tees.is_empty());
    !any_tees
        || course
            .holes
            .iter()
            .flat_map(|hole| hole.tees.iter())
            .any(|tee| tee.color.eq_ignore_ascii_case(color))
}

/// Create a group with a freshly generated access code.
pub async fn create_group(
    state: &SharedState,
    request: CreateGroupRequest,
) -> Result<GroupSummary, ServiceError> {
    let start = HoleNumber::try_from(request.start_hole)?;
    let store = state.require_store().await?;
    // Held until the insert so two groups never claim the same player.
    let _roster = state.lock_tournament(request.tournament_id).await;
    let tournament = require_tournament(&store, request.tournament_id).await?;
    if tournament.status == TournamentStatusEntity::Completed {
        return Err(ServiceError::InvalidState(format!(
            "tournament `{}` is already completed",
            tournament.id
        )));
    }
    let course = require_course(&store, tournament.course_id).await?;

    let mut seen = HashSet::new();
    for member in &request.members {
        if !seen.insert(member.player_id) {
            return Err(ServiceError::InvalidInput(format!(
                "player `{}` appears more than once in the group",
                member.player_id
            )));
        }
        if store.find_player(member.player_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!(
                "player `{}` not found",
                member.player_id
            )));
        }
        if let Some(category) = &member.category {
            if !tournament.categories.iter().any(|known| known == category) {
                return Err(ServiceError::InvalidInput(format!(
                    "category `{category}` is not declared by the tournament"
                )));
            }
        }
        if !course_has_tee(&course, &member.tee_color) {
            return Err(ServiceError::InvalidInput(format!(
                "tee `{}` does not exist on course `{}`",
                member.tee_color, course.name
            )));
        }
    }

    let existing = store.list_groups(tournament.id).await?;
    if let Some((player_id, group_id)) = existing.iter().find_map(|group| {
        group
            .members
            .iter()
            .find(|member| seen.contains(&member.player_id))
            .map(|member| (member.player_id, group.id))
    }) {
        return Err(ServiceError::Conflict(format!(
            "player `{player_id}` already plays in group `{group_id}`"
        )));
    }

    let members: Vec<GroupMemberEntity> = request
        .members
        .into_iter()
        .map(|member| GroupMemberEntity {
            player_id: member.player_id,
            course_handicap: member.course_handicap,
            tee_color: member.tee_color.trim().to_string(),
            category: member.category,
        })
        .collect();

    let length = state.config().access_code_length();
    let now = SystemTime::now();
    for attempt in 0..MAX_ACCESS_CODE_ATTEMPTS {
        let group = GroupEntity {
            id: Uuid::new_v4(),
            tournament_id: tournament.id,
            start_hole: start.get(),
            access_code: generate_access_code(length),
            status: GroupStatusEntity::Pending,
            editing: false,
            members: members.clone(),
            scores: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        };

        match store.insert_group(group.clone()).await {
            Ok(()) => {
                info!(
                    group_id = %group.id,
                    tournament_id = %tournament.id,
                    start_hole = group.start_hole,
                    members = group.members.len(),
                    "group created"
                );
                return Ok(GroupSummary::from(&GroupRound::try_from(group)?));
            }
            Err(StorageError::Conflict { message }) => {
                debug!(attempt, %message, "access code collision; regenerating");
            }
            Err(err) => return Err(err.into()),
        }
    }

    warn!(tournament_id = %tournament.id, "exhausted access code attempts");
    Err(ServiceError::Conflict(
        "could not allocate a unique access code".into(),
    ))
}

pub async fn list_groups(
    state: &SharedState,
    tournament_id: Uuid,
) -> Result<Vec<GroupSummary>, ServiceError> {
    let store = state.require_store().await?;
    require_tournament(&store, tournament_id).await?;
    store
        .list_groups(tournament_id)
        .await?
        .into_iter()
        .map(|group| GroupRound::try_from(group).map(|round| GroupSummary::from(&round)))
        .collect()
}

pub async fn get_group(state: &SharedState, id: Uuid) -> Result<GroupSummary, ServiceError> {
    let store = state.require_store().await?;
    Ok(GroupSummary::from(&require_group(&store, id).await?))
}

/// Look a group up by the code handed to its scorer.
pub async fn find_group_by_code(
    state: &SharedState,
    access_code: &str,
) -> Result<GroupSummary, ServiceError> {
    let store = state.require_store().await?;
    let code = access_code.trim().to_ascii_uppercase();
    let group = store
        .find_group_by_access_code(code)
        .await?
        .ok_or_else(|| ServiceError::NotFound("code not found".into()))?;
    Ok(GroupSummary::from(&GroupRound::try_from(group)?))
}

pub async fn delete_group(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    let guard = state.lock_group(id).await;
    let deleted = store.delete_group(id).await?;
    drop(guard);
    state.forget_group(id);
    if !deleted {
        return Err(ServiceError::NotFound(format!("group `{id}` not found")));
    }
    info!(group_id = %id, "group deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dto::{admin::GroupMemberInput, common::EventKindDto},
        services::test_support::{
            course_request, memory_state, register, seed_group, seed_pair, seed_tournament,
        },
    };

    fn tournament_request(course_id: Uuid) -> CreateTournamentRequest {
        CreateTournamentRequest {
            name: "Club Medal".into(),
            date: "2026-05-02".into(),
            course_id,
            kind: EventKindDto::Tournament,
            categories: Vec::new(),
        }
    }

    fn member(player_id: Uuid) -> GroupMemberInput {
        GroupMemberInput {
            player_id,
            course_handicap: None,
            tee_color: "white".into(),
            category: None,
        }
    }

    #[test]
    fn access_codes_avoid_look_alike_characters() {
        for _ in 0..64 {
            let code = generate_access_code(6);
            assert_eq!(code.len(), 6);
            assert!(
                code.bytes()
                    .all(|byte| ACCESS_CODE_ALPHABET.contains(&byte))
            );
            assert!(!code.contains(['0', 'O', '1', 'I']));
        }
    }

    #[tokio::test]
    async fn course_must_be_finalized_before_scheduling() {
        let state = memory_state().await;
        let course = create_course(&state, course_request(true)).await.unwrap();
        assert_eq!(course.holes.first().map(|hole| hole.number), Some(1));

        let err = create_tournament(&state, tournament_request(course.id))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        finalize_course(&state, course.id).await.unwrap();
        let tournament = create_tournament(&state, tournament_request(course.id))
            .await
            .unwrap();
        assert_eq!(
            tournament.status,
            crate::dto::common::TournamentStatusDto::Scheduled
        );
    }

    #[tokio::test]
    async fn finalizing_requires_every_stroke_index() {
        let state = memory_state().await;
        let course = create_course(&state, course_request(false)).await.unwrap();

        let err = finalize_course(&state, course.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert!(!get_course(&state, course.id).await.unwrap().finalized);
    }

    #[tokio::test]
    async fn course_needs_eighteen_distinct_holes() {
        let state = memory_state().await;
        let mut request = course_request(true);
        request.holes.pop();

        let err = create_course(&state, request).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn group_members_are_validated() {
        let state = memory_state().await;
        let tournament_id = seed_tournament(&state, &["seniors"]).await;
        let player = register(&state, "Dana").await;

        let duplicate = create_group(
            &state,
            CreateGroupRequest {
                tournament_id,
                start_hole: 1,
                members: vec![member(player), member(player)],
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(duplicate, ServiceError::InvalidInput(_)));

        let unknown = create_group(
            &state,
            CreateGroupRequest {
                tournament_id,
                start_hole: 1,
                members: vec![member(Uuid::new_v4())],
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(unknown, ServiceError::NotFound(_)));

        let mut wrong_tee = member(player);
        wrong_tee.tee_color = "purple".into();
        let tee = create_group(
            &state,
            CreateGroupRequest {
                tournament_id,
                start_hole: 1,
                members: vec![wrong_tee],
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(tee, ServiceError::InvalidInput(_)));

        let mut wrong_category = member(player);
        wrong_category.category = Some("juniors".into());
        let category = create_group(
            &state,
            CreateGroupRequest {
                tournament_id,
                start_hole: 1,
                members: vec![wrong_category],
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(category, ServiceError::InvalidInput(_)));

        let start = create_group(
            &state,
            CreateGroupRequest {
                tournament_id,
                start_hole: 0,
                members: vec![member(player)],
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(start, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn player_cannot_join_two_groups_of_a_tournament() {
        let state = memory_state().await;
        let seeded = seed_pair(&state, 1).await;

        let err = create_group(
            &state,
            CreateGroupRequest {
                tournament_id: seeded.tournament_id,
                start_hole: 10,
                members: vec![member(seeded.players[0])],
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_groups_cannot_share_a_player() {
        let state = memory_state().await;
        let tournament_id = seed_tournament(&state, &[]).await;
        let player = register(&state, "Gus").await;

        let mut handles = Vec::new();
        for start_hole in 1..=8 {
            let state = state.clone();
            handles.push(tokio::spawn(async move {
                create_group(
                    &state,
                    CreateGroupRequest {
                        tournament_id,
                        start_hole,
                        members: vec![member(player)],
                    },
                )
                .await
            }));
        }

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(ServiceError::Conflict(message)) => {
                    assert!(message.contains("already plays in group"));
                }
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(list_groups(&state, tournament_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn groups_are_found_by_code_and_deleted() {
        let state = memory_state().await;
        let tournament_id = seed_tournament(&state, &[]).await;
        let player = register(&state, "Eli").await;
        let seeded = seed_group(&state, tournament_id, 4, &[(player, Some(12), None)]).await;

        let found = find_group_by_code(&state, &seeded.access_code.to_lowercase())
            .await
            .unwrap();
        assert_eq!(found.id, seeded.group_id);
        assert_eq!(found.start_hole, 4);

        let listed = list_groups(&state, tournament_id).await.unwrap();
        assert_eq!(listed.len(), 1);

        delete_group(&state, seeded.group_id).await.unwrap();
        let gone = get_group(&state, seeded.group_id).await.unwrap_err();
        assert!(matches!(gone, ServiceError::NotFound(_)));
        let again = delete_group(&state, seeded.group_id).await.unwrap_err();
        assert!(matches!(again, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn completed_tournament_rejects_new_groups() {
        let state = memory_state().await;
        let tournament_id = seed_tournament(&state, &[]).await;
        update_tournament_status(
            &state,
            tournament_id,
            UpdateTournamentStatusRequest {
                status: crate::dto::common::TournamentStatusDto::Completed,
            },
        )
        .await
        .unwrap();
        let player = register(&state, "Fay").await;

        let err = create_group(
            &state,
            CreateGroupRequest {
                tournament_id,
                start_hole: 1,
                members: vec![member(player)],
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }
}
