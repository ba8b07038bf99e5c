use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::BoxFuture;
use uuid::Uuid;

use super::TournamentStore;
use crate::dao::{
    models::{CourseEntity, GroupEntity, PlayerEntity, TournamentEntity, TournamentStatusEntity},
    storage::{StorageError, StorageResult},
};

/// Process-local store used for development, tests and single-node deployments.
#[derive(Clone, Default)]
pub struct MemoryTournamentStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    courses: DashMap<Uuid, CourseEntity>,
    tournaments: DashMap<Uuid, TournamentEntity>,
    players: DashMap<Uuid, PlayerEntity>,
    groups: DashMap<Uuid, GroupEntity>,
    access_codes: DashMap<String, Uuid>,
}

impl MemoryTournamentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryInner {
    fn remove_group(&self, id: Uuid) -> bool {
        match self.groups.remove(&id) {
            Some((_, group)) => {
                self.access_codes.remove(&group.access_code);
                true
            }
            None => false,
        }
    }

    fn remove_tournament(&self, id: Uuid) -> bool {
        let group_ids: Vec<Uuid> = self
            .groups
            .iter()
            .filter(|group| group.tournament_id == id)
            .map(|group| group.id)
            .collect();
        for group_id in group_ids {
            self.remove_group(group_id);
        }
        self.tournaments.remove(&id).is_some()
    }

    fn remove_course(&self, id: Uuid) -> bool {
        let tournament_ids: Vec<Uuid> = self
            .tournaments
            .iter()
            .filter(|tournament| tournament.course_id == id)
            .map(|tournament| tournament.id)
            .collect();
        for tournament_id in tournament_ids {
            self.remove_tournament(tournament_id);
        }
        self.courses.remove(&id).is_some()
    }

    fn insert_group(&self, group: GroupEntity) -> StorageResult<()> {
        match self.access_codes.entry(group.access_code.clone()) {
            Entry::Occupied(_) => Err(StorageError::conflict(format!(
                "access code `{}` is already in use",
                group.access_code
            ))),
            Entry::Vacant(slot) => {
                slot.insert(group.id);
                self.groups.insert(group.id, group);
                Ok(())
            }
        }
    }

    fn update_group(&self, group: GroupEntity, expected_version: u64) -> StorageResult<()> {
        let Some(mut stored) = self.groups.get_mut(&group.id) else {
            return Err(StorageError::conflict(format!(
                "group `{}` no longer exists",
                group.id
            )));
        };

        if stored.version != expected_version {
            return Err(StorageError::conflict(format!(
                "group `{}` changed concurrently (expected version {}, found {})",
                group.id, expected_version, stored.version
            )));
        }

        *stored = group;
        Ok(())
    }
}

fn ready<T: Send + 'static>(value: StorageResult<T>) -> BoxFuture<'static, StorageResult<T>> {
    Box::pin(async move { value })
}

impl TournamentStore for MemoryTournamentStore {
    fn save_course(&self, course: CourseEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.courses.insert(course.id, course);
        ready(Ok(()))
    }

    fn find_course(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<CourseEntity>>> {
        ready(Ok(self.inner.courses.get(&id).map(|c| c.clone())))
    }

    fn list_courses(&self) -> BoxFuture<'static, StorageResult<Vec<CourseEntity>>> {
        ready(Ok(self.inner.courses.iter().map(|c| c.clone()).collect()))
    }

    fn delete_course(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        ready(Ok(self.inner.remove_course(id)))
    }

    fn save_tournament(
        &self,
        tournament: TournamentEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.tournaments.insert(tournament.id, tournament);
        ready(Ok(()))
    }

    fn find_tournament(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<TournamentEntity>>> {
        ready(Ok(self.inner.tournaments.get(&id).map(|t| t.clone())))
    }

    fn list_tournaments(&self) -> BoxFuture<'static, StorageResult<Vec<TournamentEntity>>> {
        ready(Ok(self.inner.tournaments.iter().map(|t| t.clone()).collect()))
    }

    fn update_tournament_status_if(
        &self,
        id: Uuid,
        expected: TournamentStatusEntity,
        status: TournamentStatusEntity,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let written = match self.inner.tournaments.get_mut(&id) {
            Some(mut tournament) if tournament.status == expected => {
                tournament.status = status;
                true
            }
            _ => false,
        };
        ready(Ok(written))
    }

    fn delete_tournament(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        ready(Ok(self.inner.remove_tournament(id)))
    }

    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.players.insert(player.id, player);
        ready(Ok(()))
    }

    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        ready(Ok(self.inner.players.get(&id).map(|p| p.clone())))
    }

    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        ready(Ok(self.inner.players.iter().map(|p| p.clone()).collect()))
    }

    fn find_players(&self, ids: Vec<Uuid>) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        ready(Ok(ids
            .iter()
            .filter_map(|id| self.inner.players.get(id).map(|p| p.clone()))
            .collect()))
    }

    fn insert_group(&self, group: GroupEntity) -> BoxFuture<'static, StorageResult<()>> {
        ready(self.inner.insert_group(group))
    }

    fn update_group(
        &self,
        group: GroupEntity,
        expected_version: u64,
    ) -> BoxFuture<'static, StorageResult<()>> {
        ready(self.inner.update_group(group, expected_version))
    }

    fn find_group(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GroupEntity>>> {
        ready(Ok(self.inner.groups.get(&id).map(|g| g.clone())))
    }

    fn find_group_by_access_code(
        &self,
        access_code: String,
    ) -> BoxFuture<'static, StorageResult<Option<GroupEntity>>> {
        let group = self
            .inner
            .access_codes
            .get(&access_code)
            .map(|id| *id)
            .and_then(|id| self.inner.groups.get(&id).map(|g| g.clone()));
        ready(Ok(group))
    }

    fn list_groups(
        &self,
        tournament_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<GroupEntity>>> {
        let groups = self
            .inner
            .groups
            .iter()
            .filter(|group| group.tournament_id == tournament_id)
            .map(|group| group.clone())
            .collect();
        ready(Ok(groups))
    }

    fn delete_group(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        ready(Ok(self.inner.remove_group(id)))
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        ready(Ok(()))
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;
    use crate::dao::models::{EventKindEntity, GroupStatusEntity};

    fn group(tournament_id: Uuid, access_code: &str) -> GroupEntity {
        GroupEntity {
            id: Uuid::new_v4(),
            tournament_id,
            start_hole: 1,
            access_code: access_code.into(),
            status: GroupStatusEntity::Pending,
            editing: false,
            members: Vec::new(),
            scores: Vec::new(),
            version: 0,
            created_at: SystemTime::now(),
            updated_at: SystemTime::now(),
        }
    }

    fn tournament(course_id: Uuid) -> TournamentEntity {
        TournamentEntity {
            id: Uuid::new_v4(),
            name: "Club championship".into(),
            date: "2026-06-01".into(),
            course_id,
            kind: EventKindEntity::Tournament,
            status: TournamentStatusEntity::Scheduled,
            categories: Vec::new(),
            created_at: SystemTime::now(),
        }
    }

    #[tokio::test]
    async fn stale_version_is_a_conflict() {
        let store = MemoryTournamentStore::new();
        let mut stored = group(Uuid::new_v4(), "ABC123");
        store.insert_group(stored.clone()).await.unwrap();

        stored.version = 1;
        store.update_group(stored.clone(), 0).await.unwrap();

        let err = store.update_group(stored, 0).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict { .. }));
    }

    #[tokio::test]
    async fn access_codes_are_unique() {
        let store = MemoryTournamentStore::new();
        let tournament_id = Uuid::new_v4();
        store
            .insert_group(group(tournament_id, "SAME01"))
            .await
            .unwrap();

        let err = store
            .insert_group(group(tournament_id, "SAME01"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict { .. }));
    }

    #[tokio::test]
    async fn status_update_only_applies_from_the_expected_status() {
        let store = MemoryTournamentStore::new();
        let event = tournament(Uuid::new_v4());
        store.save_tournament(event.clone()).await.unwrap();

        assert!(
            store
                .update_tournament_status_if(
                    event.id,
                    TournamentStatusEntity::Scheduled,
                    TournamentStatusEntity::InProgress,
                )
                .await
                .unwrap()
        );
        assert!(
            !store
                .update_tournament_status_if(
                    event.id,
                    TournamentStatusEntity::Scheduled,
                    TournamentStatusEntity::Completed,
                )
                .await
                .unwrap()
        );
        assert!(
            !store
                .update_tournament_status_if(
                    Uuid::new_v4(),
                    TournamentStatusEntity::Scheduled,
                    TournamentStatusEntity::InProgress,
                )
                .await
                .unwrap()
        );

        let stored = store.find_tournament(event.id).await.unwrap().unwrap();
        assert_eq!(stored.status, TournamentStatusEntity::InProgress);
        assert_eq!(stored.name, event.name);
    }

    #[tokio::test]
    async fn find_players_returns_only_known_requested_ids() {
        let store = MemoryTournamentStore::new();
        let mut ids = Vec::new();
        for name in ["Ana", "Ben", "Cleo"] {
            let player = PlayerEntity {
                id: Uuid::new_v4(),
                name: name.into(),
                email: None,
                created_at: SystemTime::now(),
            };
            ids.push(player.id);
            store.save_player(player).await.unwrap();
        }

        let found = store
            .find_players(vec![ids[2], Uuid::new_v4(), ids[0]])
            .await
            .unwrap();
        let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Cleo", "Ana"]);
        assert!(store.find_players(Vec::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_course_cascades() {
        let store = MemoryTournamentStore::new();
        let course_id = Uuid::new_v4();
        store
            .save_course(CourseEntity {
                id: course_id,
                name: "Links".into(),
                holes: Vec::new(),
                finalized: false,
                created_at: SystemTime::now(),
            })
            .await
            .unwrap();
        let event = tournament(course_id);
        store.save_tournament(event.clone()).await.unwrap();
        let grouped = group(event.id, "CASC01");
        store.insert_group(grouped.clone()).await.unwrap();

        assert!(store.delete_course(course_id).await.unwrap());
        assert!(store.find_tournament(event.id).await.unwrap().is_none());
        assert!(store.find_group(grouped.id).await.unwrap().is_none());
        assert!(
            store
                .find_group_by_access_code("CASC01".into())
                .await
                .unwrap()
                .is_none()
        );
    }
}
