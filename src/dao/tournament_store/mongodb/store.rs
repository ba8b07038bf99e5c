use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::{Document, doc},
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        MongoCourseDocument, MongoGroupDocument, MongoPlayerDocument, MongoTournamentDocument,
        doc_id, status_to_bson, version_to_bson,
    },
};
use crate::dao::{
    models::{CourseEntity, GroupEntity, PlayerEntity, TournamentEntity, TournamentStatusEntity},
    storage::StorageResult,
    tournament_store::TournamentStore,
};

const COURSE_COLLECTION_NAME: &str = "courses";
const TOURNAMENT_COLLECTION_NAME: &str = "tournaments";
const PLAYER_COLLECTION_NAME: &str = "players";
const GROUP_COLLECTION_NAME: &str = "groups";
const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Clone)]
pub struct MongoTournamentStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY_CODE
    )
}

impl MongoTournamentStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let groups = self.collection::<Document>(GROUP_COLLECTION_NAME).await;
        let access_code = IndexModel::builder()
            .keys(doc! {"access_code": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("group_access_code_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();
        groups
            .create_index(access_code)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: GROUP_COLLECTION_NAME,
                index: "access_code",
                source,
            })?;

        let by_tournament = IndexModel::builder()
            .keys(doc! {"tournament_id": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("group_tournament_idx".to_owned()))
                    .build(),
            )
            .build();
        groups
            .create_index(by_tournament)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: GROUP_COLLECTION_NAME,
                index: "tournament_id",
                source,
            })?;

        let tournaments = self.collection::<Document>(TOURNAMENT_COLLECTION_NAME).await;
        let by_course = IndexModel::builder()
            .keys(doc! {"course_id": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("tournament_course_idx".to_owned()))
                    .build(),
            )
            .build();
        tournaments
            .create_index(by_course)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: TOURNAMENT_COLLECTION_NAME,
                index: "course_id",
                source,
            })?;

        Ok(())
    }

    async fn collection<T>(&self, name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        let guard = self.inner.state.read().await;
        guard.database.collection::<T>(name)
    }

    async fn upsert<T>(&self, collection: &'static str, id: Uuid, document: T) -> MongoResult<()>
    where
        T: Serialize + Send + Sync,
    {
        self.collection::<T>(collection)
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Save {
                collection,
                id,
                source,
            })?;
        Ok(())
    }

    async fn find_one<D, E>(
        &self,
        collection: &'static str,
        filter: Document,
    ) -> MongoResult<Option<E>>
    where
        D: DeserializeOwned + Send + Sync,
        E: TryFrom<D, Error = MongoDaoError>,
    {
        let document = self
            .collection::<D>(collection)
            .await
            .find_one(filter)
            .await
            .map_err(|source| MongoDaoError::Load { collection, source })?;
        document.map(E::try_from).transpose()
    }

    async fn find_many<D, E>(
        &self,
        collection: &'static str,
        filter: Document,
    ) -> MongoResult<Vec<E>>
    where
        D: DeserializeOwned + Unpin + Send + Sync,
        E: TryFrom<D, Error = MongoDaoError>,
    {
        let documents: Vec<D> = self
            .collection::<D>(collection)
            .await
            .find(filter)
            .await
            .map_err(|source| MongoDaoError::Load { collection, source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::Load { collection, source })?;
        documents.into_iter().map(E::try_from).collect()
    }

    async fn delete_many(&self, collection: &'static str, filter: Document) -> MongoResult<u64> {
        let result = self
            .collection::<Document>(collection)
            .await
            .delete_many(filter)
            .await
            .map_err(|source| MongoDaoError::Delete { collection, source })?;
        Ok(result.deleted_count)
    }

    async fn delete_tournaments(&self, ids: Vec<Uuid>) -> MongoResult<u64> {
        let ids: Vec<String> = ids.into_iter().map(|id| id.to_string()).collect();
        self.delete_many(
            GROUP_COLLECTION_NAME,
            doc! {"tournament_id": {"$in": ids.clone()}},
        )
        .await?;
        self.delete_many(TOURNAMENT_COLLECTION_NAME, doc! {"_id": {"$in": ids}})
            .await
    }

    async fn delete_course(&self, id: Uuid) -> MongoResult<bool> {
        let tournaments: Vec<TournamentEntity> = self
            .find_many::<MongoTournamentDocument, _>(
                TOURNAMENT_COLLECTION_NAME,
                doc! {"course_id": id.to_string()},
            )
            .await?;
        self.delete_tournaments(tournaments.into_iter().map(|t| t.id).collect())
            .await?;
        let deleted = self.delete_many(COURSE_COLLECTION_NAME, doc_id(id)).await?;
        Ok(deleted > 0)
    }

    async fn update_tournament_status_if(
        &self,
        id: Uuid,
        expected: TournamentStatusEntity,
        status: TournamentStatusEntity,
    ) -> MongoResult<bool> {
        let result = self
            .collection::<MongoTournamentDocument>(TOURNAMENT_COLLECTION_NAME)
            .await
            .update_one(
                doc! {"_id": id.to_string(), "status": status_to_bson(expected)},
                doc! {"$set": {"status": status_to_bson(status)}},
            )
            .await
            .map_err(|source| MongoDaoError::Save {
                collection: TOURNAMENT_COLLECTION_NAME,
                id,
                source,
            })?;
        Ok(result.matched_count > 0)
    }

    async fn insert_group(&self, group: GroupEntity) -> MongoResult<()> {
        let id = group.id;
        let access_code = group.access_code.clone();
        let document: MongoGroupDocument = group.into();
        self.collection::<MongoGroupDocument>(GROUP_COLLECTION_NAME)
            .await
            .insert_one(&document)
            .await
            .map_err(|source| {
                if is_duplicate_key(&source) {
                    MongoDaoError::DuplicateAccessCode { access_code }
                } else {
                    MongoDaoError::Save {
                        collection: GROUP_COLLECTION_NAME,
                        id,
                        source,
                    }
                }
            })?;
        Ok(())
    }

    async fn update_group(&self, group: GroupEntity, expected_version: u64) -> MongoResult<()> {
        let id = group.id;
        let document: MongoGroupDocument = group.into();
        let result = self
            .collection::<MongoGroupDocument>(GROUP_COLLECTION_NAME)
            .await
            .replace_one(
                doc! {"_id": id.to_string(), "version": version_to_bson(expected_version)},
                &document,
            )
            .await
            .map_err(|source| MongoDaoError::Save {
                collection: GROUP_COLLECTION_NAME,
                id,
                source,
            })?;

        if result.matched_count == 0 {
            return Err(MongoDaoError::VersionConflict {
                id,
                expected: expected_version,
            });
        }
        Ok(())
    }
}

impl TournamentStore for MongoTournamentStore {
    fn save_course(&self, course: CourseEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let id = course.id;
            let document: MongoCourseDocument = course.into();
            store
                .upsert(COURSE_COLLECTION_NAME, id, document)
                .await
                .map_err(Into::into)
        })
    }

    fn find_course(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<CourseEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_one::<MongoCourseDocument, _>(COURSE_COLLECTION_NAME, doc_id(id))
                .await
                .map_err(Into::into)
        })
    }

    fn list_courses(&self) -> BoxFuture<'static, StorageResult<Vec<CourseEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_many::<MongoCourseDocument, _>(COURSE_COLLECTION_NAME, doc! {})
                .await
                .map_err(Into::into)
        })
    }

    fn delete_course(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_course(id).await.map_err(Into::into) })
    }

    fn save_tournament(
        &self,
        tournament: TournamentEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let id = tournament.id;
            let document: MongoTournamentDocument = tournament.into();
            store
                .upsert(TOURNAMENT_COLLECTION_NAME, id, document)
                .await
                .map_err(Into::into)
        })
    }

    fn find_tournament(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<TournamentEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_one::<MongoTournamentDocument, _>(TOURNAMENT_COLLECTION_NAME, doc_id(id))
                .await
                .map_err(Into::into)
        })
    }

    fn list_tournaments(&self) -> BoxFuture<'static, StorageResult<Vec<TournamentEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_many::<MongoTournamentDocument, _>(TOURNAMENT_COLLECTION_NAME, doc! {})
                .await
                .map_err(Into::into)
        })
    }

    fn update_tournament_status_if(
        &self,
        id: Uuid,
        expected: TournamentStatusEntity,
        status: TournamentStatusEntity,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_tournament_status_if(id, expected, status)
                .await
                .map_err(Into::into)
        })
    }

    fn delete_tournament(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let deleted = store.delete_tournaments(vec![id]).await?;
            Ok(deleted > 0)
        })
    }

    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let id = player.id;
            let document: MongoPlayerDocument = player.into();
            store
                .upsert(PLAYER_COLLECTION_NAME, id, document)
                .await
                .map_err(Into::into)
        })
    }

    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_one::<MongoPlayerDocument, _>(PLAYER_COLLECTION_NAME, doc_id(id))
                .await
                .map_err(Into::into)
        })
    }

    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_many::<MongoPlayerDocument, _>(PLAYER_COLLECTION_NAME, doc! {})
                .await
                .map_err(Into::into)
        })
    }

    fn find_players(&self, ids: Vec<Uuid>) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let ids: Vec<String> = ids.into_iter().map(|id| id.to_string()).collect();
            store
                .find_many::<MongoPlayerDocument, _>(
                    PLAYER_COLLECTION_NAME,
                    doc! {"_id": {"$in": ids}},
                )
                .await
                .map_err(Into::into)
        })
    }

    fn insert_group(&self, group: GroupEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_group(group).await.map_err(Into::into) })
    }

    fn update_group(
        &self,
        group: GroupEntity,
        expected_version: u64,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_group(group, expected_version)
                .await
                .map_err(Into::into)
        })
    }

    fn find_group(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GroupEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_one::<MongoGroupDocument, _>(GROUP_COLLECTION_NAME, doc_id(id))
                .await
                .map_err(Into::into)
        })
    }

    fn find_group_by_access_code(
        &self,
        access_code: String,
    ) -> BoxFuture<'static, StorageResult<Option<GroupEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_one::<MongoGroupDocument, _>(
                    GROUP_COLLECTION_NAME,
                    doc! {"access_code": access_code},
                )
                .await
                .map_err(Into::into)
        })
    }

    fn list_groups(
        &self,
        tournament_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<GroupEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_many::<MongoGroupDocument, _>(
                    GROUP_COLLECTION_NAME,
                    doc! {"tournament_id": tournament_id.to_string()},
                )
                .await
                .map_err(Into::into)
        })
    }

    fn delete_group(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let deleted = store.delete_many(GROUP_COLLECTION_NAME, doc_id(id)).await?;
            Ok(deleted > 0)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
