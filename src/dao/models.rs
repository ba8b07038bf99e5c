use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// Course definition: the 18 holes a tournament is played on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CourseEntity {
    /// Stable identifier for the course.
    pub id: Uuid,
    /// Human readable course name.
    pub name: String,
    /// Holes in official order.
    pub holes: Vec<HoleEntity>,
    /// Set once every stroke index has been checked to form a permutation of 1..18.
    pub finalized: bool,
    /// Creation timestamp.
    pub created_at: SystemTime,
}

/// One hole of a course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HoleEntity {
    /// Official hole number (1..18).
    pub number: u8,
    /// Par for the hole (3..5).
    pub par: u8,
    /// Difficulty rank used for handicap allocation, if published.
    pub stroke_index: Option<u8>,
    /// Yardage per tee color.
    pub tees: Vec<TeeEntity>,
    /// Optional illustration of the hole.
    pub image_url: Option<String>,
}

/// Yardage of one tee box.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeeEntity {
    /// Tee color label (e.g. "white").
    pub color: String,
    /// Distance in yards.
    pub yardage: u32,
}

/// Whether an event counts for the standings or is a practice round.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventKindEntity {
    Tournament,
    Training,
}

/// Tournament lifecycle as stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatusEntity {
    Scheduled,
    InProgress,
    Completed,
}

/// Tournament played on a single course on a single day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TournamentEntity {
    pub id: Uuid,
    pub name: String,
    /// Calendar date formatted as `YYYY-MM-DD`.
    pub date: String,
    pub course_id: Uuid,
    pub kind: EventKindEntity,
    pub status: TournamentStatusEntity,
    /// Declared categories, in display order.
    pub categories: Vec<String>,
    pub created_at: SystemTime,
}

/// Registered player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerEntity {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub created_at: SystemTime,
}

/// Group status as stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GroupStatusEntity {
    Pending,
    Completed,
}

/// Membership of a player in a group, with the per-round details the scorer needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupMemberEntity {
    pub player_id: Uuid,
    /// Course handicap for this round; missing means scratch.
    pub course_handicap: Option<u8>,
    pub tee_color: String,
    pub category: Option<String>,
}

/// Strokes recorded by one player on one hole.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreEntity {
    pub player_id: Uuid,
    pub hole: u8,
    pub strokes: u8,
}

/// Group of players sharing a scorecard and a starting hole.
///
/// Scores live inside the group record so a hole confirmation is a single
/// conditional write guarded by `version`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupEntity {
    pub id: Uuid,
    pub tournament_id: Uuid,
    /// Hole the group tees off on (1..18).
    pub start_hole: u8,
    /// Code handed to the scorer to open the card.
    pub access_code: String,
    pub status: GroupStatusEntity,
    /// Completed card re-opened for review.
    pub editing: bool,
    pub members: Vec<GroupMemberEntity>,
    pub scores: Vec<ScoreEntity>,
    /// Incremented on every successful write.
    pub version: u64,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}
