use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("missing environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to write {collection} document `{id}`")]
    Save {
        collection: &'static str,
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to load from {collection}")]
    Load {
        collection: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to delete from {collection}")]
    Delete {
        collection: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("stored identifier `{value}` is not a valid UUID")]
    InvalidId {
        value: String,
        #[source]
        source: uuid::Error,
    },
    #[error("access code `{access_code}` is already in use")]
    DuplicateAccessCode { access_code: String },
    #[error("group `{id}` changed concurrently or no longer exists (expected version {expected})")]
    VersionConflict { id: Uuid, expected: u64 },
}
