pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{
    CourseEntity, GroupEntity, PlayerEntity, TournamentEntity, TournamentStatusEntity,
};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence layer for courses, tournaments, players and groups.
pub trait TournamentStore: Send + Sync {
    fn save_course(&self, course: CourseEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_course(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<CourseEntity>>>;
    fn list_courses(&self) -> BoxFuture<'static, StorageResult<Vec<CourseEntity>>>;
    /// Delete a course together with its tournaments and their groups.
    fn delete_course(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;

    fn save_tournament(&self, tournament: TournamentEntity)
    -> BoxFuture<'static, StorageResult<()>>;
    fn find_tournament(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<TournamentEntity>>>;
    fn list_tournaments(&self) -> BoxFuture<'static, StorageResult<Vec<TournamentEntity>>>;
    /// Set the status only while it still equals `expected`. Returns whether it was written.
    fn update_tournament_status_if(
        &self,
        id: Uuid,
        expected: TournamentStatusEntity,
        status: TournamentStatusEntity,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Delete a tournament together with its groups.
    fn delete_tournament(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;

    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>>;
    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;
    /// Players among `ids`; unknown ids are skipped.
    fn find_players(&self, ids: Vec<Uuid>) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;

    /// Insert a new group. Fails with a conflict when the access code is taken.
    fn insert_group(&self, group: GroupEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Replace a group only if the stored version still equals `expected_version`.
    fn update_group(
        &self,
        group: GroupEntity,
        expected_version: u64,
    ) -> BoxFuture<'static, StorageResult<()>>;
    fn find_group(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GroupEntity>>>;
    fn find_group_by_access_code(
        &self,
        access_code: String,
    ) -> BoxFuture<'static, StorageResult<Option<GroupEntity>>>;
    fn list_groups(&self, tournament_id: Uuid)
    -> BoxFuture<'static, StorageResult<Vec<GroupEntity>>>;
    fn delete_group(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
