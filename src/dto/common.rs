use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dao::models::{EventKindEntity, TournamentStatusEntity},
    state::state_machine::GroupPhase,
};

/// Lifecycle of a group's card as exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GroupStatusDto {
    InProgress,
    Completed,
    CompletedEditing,
}

impl From<GroupPhase> for GroupStatusDto {
    fn from(phase: GroupPhase) -> Self {
        match phase {
            GroupPhase::InProgress { .. } => GroupStatusDto::InProgress,
            GroupPhase::Completed => GroupStatusDto::Completed,
            GroupPhase::CompletedEditing => GroupStatusDto::CompletedEditing,
        }
    }
}

/// Tournament lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatusDto {
    Scheduled,
    InProgress,
    Completed,
}

impl From<TournamentStatusEntity> for TournamentStatusDto {
    fn from(value: TournamentStatusEntity) -> Self {
        match value {
            TournamentStatusEntity::Scheduled => TournamentStatusDto::Scheduled,
            TournamentStatusEntity::InProgress => TournamentStatusDto::InProgress,
            TournamentStatusEntity::Completed => TournamentStatusDto::Completed,
        }
    }
}

impl From<TournamentStatusDto> for TournamentStatusEntity {
    fn from(value: TournamentStatusDto) -> Self {
        match value {
            TournamentStatusDto::Scheduled => TournamentStatusEntity::Scheduled,
            TournamentStatusDto::InProgress => TournamentStatusEntity::InProgress,
            TournamentStatusDto::Completed => TournamentStatusEntity::Completed,
        }
    }
}

/// Competitive event or practice round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventKindDto {
    #[default]
    Tournament,
    Training,
}

impl From<EventKindEntity> for EventKindDto {
    fn from(value: EventKindEntity) -> Self {
        match value {
            EventKindEntity::Tournament => EventKindDto::Tournament,
            EventKindEntity::Training => EventKindDto::Training,
        }
    }
}

impl From<EventKindDto> for EventKindEntity {
    fn from(value: EventKindDto) -> Self {
        match value {
            EventKindDto::Tournament => EventKindEntity::Tournament,
            EventKindDto::Training => EventKindEntity::Training,
        }
    }
}
