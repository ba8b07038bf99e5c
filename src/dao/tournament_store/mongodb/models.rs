use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{MongoDaoError, MongoResult};
use crate::dao::models::{
    CourseEntity, EventKindEntity, GroupEntity, GroupMemberEntity, GroupStatusEntity, HoleEntity,
    PlayerEntity, ScoreEntity, TournamentEntity, TournamentStatusEntity,
};

/// Identifiers are stored as their hyphenated string form so filters stay readable.
pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}

fn parse_id(value: &str) -> MongoResult<Uuid> {
    Uuid::parse_str(value).map_err(|source| MongoDaoError::InvalidId {
        value: value.to_owned(),
        source,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoCourseDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    holes: Vec<HoleEntity>,
    finalized: bool,
    created_at: DateTime,
}

impl From<CourseEntity> for MongoCourseDocument {
    fn from(value: CourseEntity) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            holes: value.holes,
            finalized: value.finalized,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl TryFrom<MongoCourseDocument> for CourseEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoCourseDocument) -> MongoResult<Self> {
        Ok(Self {
            id: parse_id(&value.id)?,
            name: value.name,
            holes: value.holes,
            finalized: value.finalized,
            created_at: value.created_at.to_system_time(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoTournamentDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    date: String,
    course_id: String,
    kind: EventKindEntity,
    status: TournamentStatusEntity,
    #[serde(default)]
    categories: Vec<String>,
    created_at: DateTime,
}

impl From<TournamentEntity> for MongoTournamentDocument {
    fn from(value: TournamentEntity) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            date: value.date,
            course_id: value.course_id.to_string(),
            kind: value.kind,
            status: value.status,
            categories: value.categories,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl TryFrom<MongoTournamentDocument> for TournamentEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoTournamentDocument) -> MongoResult<Self> {
        Ok(Self {
            id: parse_id(&value.id)?,
            name: value.name,
            date: value.date,
            course_id: parse_id(&value.course_id)?,
            kind: value.kind,
            status: value.status,
            categories: value.categories,
            created_at: value.created_at.to_system_time(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoPlayerDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    email: Option<String>,
    created_at: DateTime,
}

impl From<PlayerEntity> for MongoPlayerDocument {
    fn from(value: PlayerEntity) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            email: value.email,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl TryFrom<MongoPlayerDocument> for PlayerEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoPlayerDocument) -> MongoResult<Self> {
        Ok(Self {
            id: parse_id(&value.id)?,
            name: value.name,
            email: value.email,
            created_at: value.created_at.to_system_time(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMemberDocument {
    player_id: String,
    course_handicap: Option<u8>,
    tee_color: String,
    category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoScoreDocument {
    player_id: String,
    hole: u8,
    strokes: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGroupDocument {
    #[serde(rename = "_id")]
    id: String,
    tournament_id: String,
    start_hole: u8,
    access_code: String,
    status: GroupStatusEntity,
    #[serde(default)]
    editing: bool,
    members: Vec<MongoMemberDocument>,
    #[serde(default)]
    scores: Vec<MongoScoreDocument>,
    version: i64,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<GroupEntity> for MongoGroupDocument {
    fn from(value: GroupEntity) -> Self {
        Self {
            id: value.id.to_string(),
            tournament_id: value.tournament_id.to_string(),
            start_hole: value.start_hole,
            access_code: value.access_code,
            status: value.status,
            editing: value.editing,
            members: value
                .members
                .into_iter()
                .map(|member| MongoMemberDocument {
                    player_id: member.player_id.to_string(),
                    course_handicap: member.course_handicap,
                    tee_color: member.tee_color,
                    category: member.category,
                })
                .collect(),
            scores: value
                .scores
                .into_iter()
                .map(|score| MongoScoreDocument {
                    player_id: score.player_id.to_string(),
                    hole: score.hole,
                    strokes: score.strokes,
                })
                .collect(),
            version: version_to_bson(value.version),
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl TryFrom<MongoGroupDocument> for GroupEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoGroupDocument) -> MongoResult<Self> {
        let members = value
            .members
            .into_iter()
            .map(|member| {
                Ok(GroupMemberEntity {
                    player_id: parse_id(&member.player_id)?,
                    course_handicap: member.course_handicap,
                    tee_color: member.tee_color,
                    category: member.category,
                })
            })
            .collect::<MongoResult<Vec<_>>>()?;
        let scores = value
            .scores
            .into_iter()
            .map(|score| {
                Ok(ScoreEntity {
                    player_id: parse_id(&score.player_id)?,
                    hole: score.hole,
                    strokes: score.strokes,
                })
            })
            .collect::<MongoResult<Vec<_>>>()?;

        Ok(Self {
            id: parse_id(&value.id)?,
            tournament_id: parse_id(&value.tournament_id)?,
            start_hole: value.start_hole,
            access_code: value.access_code,
            status: value.status,
            editing: value.editing,
            members,
            scores,
            version: value.version.max(0) as u64,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        })
    }
}

/// BSON has no unsigned 64-bit integer; versions never come close to the signed limit.
pub fn version_to_bson(version: u64) -> i64 {
    i64::try_from(version).unwrap_or(i64::MAX)
}

/// Stored form of a tournament status, for use in query filters.
pub fn status_to_bson(status: TournamentStatusEntity) -> &'static str {
    match status {
        TournamentStatusEntity::Scheduled => "scheduled",
        TournamentStatusEntity::InProgress => "in_progress",
        TournamentStatusEntity::Completed => "completed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_filter_matches_the_serialized_field() {
        for status in [
            TournamentStatusEntity::Scheduled,
            TournamentStatusEntity::InProgress,
            TournamentStatusEntity::Completed,
        ] {
            assert_eq!(
                serde_json::to_value(status).unwrap(),
                serde_json::Value::from(status_to_bson(status))
            );
        }
    }
}
