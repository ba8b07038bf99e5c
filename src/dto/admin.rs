//! DTO definitions used by the admin REST API and documentation layer.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{
        CourseEntity, GroupMemberEntity, HoleEntity, PlayerEntity, TeeEntity, TournamentEntity,
    },
    dto::{
        common::{EventKindDto, GroupStatusDto, TournamentStatusDto},
        format_system_time,
        validation::{validate_date, validate_tee_color},
    },
    state::round::GroupRound,
};

/// Payload describing a new course.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    /// Exactly 18 holes, in any order.
    #[validate(length(equal = 18), nested)]
    pub holes: Vec<HoleInput>,
}

/// One hole of a new course.
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
pub struct HoleInput {
    #[validate(range(min = 1, max = 18))]
    pub number: u8,
    #[validate(range(min = 3, max = 5))]
    pub par: u8,
    /// May be left out while the course is being set up; required before finalizing.
    #[validate(range(min = 1, max = 18))]
    pub stroke_index: Option<u8>,
    #[serde(default)]
    #[validate(nested)]
    pub tees: Vec<TeeInput>,
    #[validate(url)]
    pub image_url: Option<String>,
}

/// Yardage of one tee box.
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
pub struct TeeInput {
    #[validate(custom(function = validate_tee_color))]
    pub color: String,
    pub yardage: u32,
}

/// Tee box as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeeSummary {
    pub color: String,
    pub yardage: u32,
}

/// Hole as returned to clients.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HoleSummary {
    pub number: u8,
    pub par: u8,
    pub stroke_index: Option<u8>,
    pub tees: Vec<TeeSummary>,
    pub image_url: Option<String>,
}

/// Course with its holes.
#[derive(Debug, Serialize, ToSchema)]
pub struct CourseSummary {
    pub id: Uuid,
    pub name: String,
    pub finalized: bool,
    pub total_par: u32,
    pub created_at: String,
    pub holes: Vec<HoleSummary>,
}

impl From<TeeEntity> for TeeSummary {
    fn from(value: TeeEntity) -> Self {
        Self {
            color: value.color,
            yardage: value.yardage,
        }
    }
}

impl From<HoleEntity> for HoleSummary {
    fn from(value: HoleEntity) -> Self {
        Self {
            number: value.number,
            par: value.par,
            stroke_index: value.stroke_index,
            tees: value.tees.into_iter().map(Into::into).collect(),
            image_url: value.image_url,
        }
    }
}

impl From<CourseEntity> for CourseSummary {
    fn from(value: CourseEntity) -> Self {
        let mut holes: Vec<HoleSummary> = value.holes.into_iter().map(Into::into).collect();
        holes.sort_by_key(|hole| hole.number);
        Self {
            id: value.id,
            name: value.name,
            finalized: value.finalized,
            total_par: holes.iter().map(|hole| u32::from(hole.par)).sum(),
            created_at: format_system_time(value.created_at),
            holes,
        }
    }
}

/// Payload scheduling a tournament on an existing course.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateTournamentRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    /// Calendar date, `YYYY-MM-DD`.
    #[validate(custom(function = validate_date))]
    pub date: String,
    pub course_id: Uuid,
    #[serde(default)]
    pub kind: EventKindDto,
    /// Category labels, in display order.
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Request moving a tournament to another status.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTournamentStatusRequest {
    pub status: TournamentStatusDto,
}

/// Tournament as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct TournamentSummary {
    pub id: Uuid,
    pub name: String,
    pub date: String,
    pub course_id: Uuid,
    pub kind: EventKindDto,
    pub status: TournamentStatusDto,
    pub categories: Vec<String>,
    pub created_at: String,
}

impl From<TournamentEntity> for TournamentSummary {
    fn from(value: TournamentEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            date: value.date,
            course_id: value.course_id,
            kind: value.kind.into(),
            status: value.status.into(),
            categories: value.categories,
            created_at: format_system_time(value.created_at),
        }
    }
}

/// Payload registering a player.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterPlayerRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
}

/// Player as returned to clients.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub created_at: String,
}

impl From<PlayerEntity> for PlayerSummary {
    fn from(value: PlayerEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            created_at: format_system_time(value.created_at),
        }
    }
}

/// Payload creating a group inside a tournament.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateGroupRequest {
    pub tournament_id: Uuid,
    #[validate(range(min = 1, max = 18))]
    pub start_hole: u8,
    /// Members in scorecard order.
    #[validate(length(min = 1), nested)]
    pub members: Vec<GroupMemberInput>,
}

/// One member of a new group.
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
pub struct GroupMemberInput {
    pub player_id: Uuid,
    /// Missing means the player plays off scratch.
    pub course_handicap: Option<u8>,
    #[validate(custom(function = validate_tee_color))]
    pub tee_color: String,
    pub category: Option<String>,
}

/// Group member as returned to clients.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GroupMemberSummary {
    pub player_id: Uuid,
    pub course_handicap: Option<u8>,
    pub tee_color: String,
    pub category: Option<String>,
}

impl From<GroupMemberEntity> for GroupMemberSummary {
    fn from(value: GroupMemberEntity) -> Self {
        Self {
            player_id: value.player_id,
            course_handicap: value.course_handicap,
            tee_color: value.tee_color,
            category: value.category,
        }
    }
}

/// Group as returned to administrators, access code included.
#[derive(Debug, Serialize, ToSchema)]
pub struct GroupSummary {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub start_hole: u8,
    pub access_code: String,
    pub status: GroupStatusDto,
    /// Number of holes confirmed in play order.
    pub holes_confirmed: usize,
    pub version: u64,
    pub members: Vec<GroupMemberSummary>,
    pub created_at: String,
}

/// Generic action acknowledgement used by admin endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    pub message: String,
}

impl From<&GroupRound> for GroupSummary {
    fn from(round: &GroupRound) -> Self {
        let record = round.record();
        Self {
            id: record.id,
            tournament_id: record.tournament_id,
            start_hole: record.start_hole,
            access_code: record.access_code.clone(),
            status: round.phase().into(),
            holes_confirmed: round
                .gate()
                .highest_confirmed_step()
                .map_or(0, |step| step + 1),
            version: record.version,
            members: record.members.iter().cloned().map(Into::into).collect(),
            created_at: format_system_time(record.created_at),
        }
    }
}
