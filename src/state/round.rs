//! Runtime views over persisted records, validated into scoring types.

use std::time::SystemTime;

use uuid::Uuid;

use crate::{
    dao::models::{CourseEntity, GroupEntity, GroupMemberEntity, GroupStatusEntity, ScoreEntity},
    error::ServiceError,
    scoring::{
        course::{CourseLayout, HoleSpec},
        gate::{GateMode, ProgressionGate},
        scorecard::ScoreCard,
        values::{CourseHandicap, HoleNumber, Par, StrokeIndex, Strokes},
    },
    state::state_machine::GroupPhase,
};

fn corrupted(what: impl std::fmt::Display) -> ServiceError {
    ServiceError::Corrupted(what.to_string())
}

/// Build the validated layout of a stored course.
pub fn course_layout(course: &CourseEntity) -> Result<CourseLayout, ServiceError> {
    let holes = course
        .holes
        .iter()
        .map(|hole| {
            Ok(HoleSpec {
                number: HoleNumber::try_from(hole.number)?,
                par: Par::try_from(hole.par)?,
                stroke_index: hole.stroke_index.map(StrokeIndex::try_from).transpose()?,
            })
        })
        .collect::<Result<Vec<_>, crate::scoring::values::ValueError>>()
        .map_err(|err| corrupted(format!("course `{}`: {err}", course.id)))?;
    CourseLayout::new(holes).map_err(|err| corrupted(format!("course `{}`: {err}", course.id)))
}

/// A group record together with its decoded card.
#[derive(Debug, Clone)]
pub struct GroupRound {
    record: GroupEntity,
    start: HoleNumber,
    card: ScoreCard,
}

impl TryFrom<GroupEntity> for GroupRound {
    type Error = ServiceError;

    fn try_from(record: GroupEntity) -> Result<Self, Self::Error> {
        let start = HoleNumber::try_from(record.start_hole)
            .map_err(|err| corrupted(format!("group `{}`: {err}", record.id)))?;
        let members = record.members.iter().map(|m| m.player_id).collect();
        let rows = record
            .scores
            .iter()
            .map(|score| {
                Ok((
                    score.player_id,
                    HoleNumber::try_from(score.hole)?,
                    Strokes::try_from(score.strokes)?,
                ))
            })
            .collect::<Result<Vec<_>, crate::scoring::values::ValueError>>()
            .map_err(|err| corrupted(format!("group `{}`: {err}", record.id)))?;
        let card = ScoreCard::from_rows(members, rows)
            .map_err(|err| corrupted(format!("group `{}`: {err}", record.id)))?;

        Ok(Self {
            record,
            start,
            card,
        })
    }
}

impl GroupRound {
    /// Underlying record.
    pub fn record(&self) -> &GroupEntity {
        &self.record
    }

    pub fn id(&self) -> Uuid {
        self.record.id
    }

    pub fn tournament_id(&self) -> Uuid {
        self.record.tournament_id
    }

    pub fn start(&self) -> HoleNumber {
        self.start
    }

    pub fn card(&self) -> &ScoreCard {
        &self.card
    }

    pub fn version(&self) -> u64 {
        self.record.version
    }

    pub fn gate(&self) -> ProgressionGate<'_> {
        ProgressionGate::new(self.start, &self.card)
    }

    /// Phase derived from the stored status and the card contents.
    pub fn phase(&self) -> GroupPhase {
        match (self.record.status, self.record.editing) {
            (GroupStatusEntity::Completed, true) => GroupPhase::CompletedEditing,
            (GroupStatusEntity::Completed, false) => GroupPhase::Completed,
            (GroupStatusEntity::Pending, _) => GroupPhase::InProgress {
                highest_confirmed_step: self.gate().highest_confirmed_step(),
            },
        }
    }

    /// Gate mode implied by the phase.
    pub fn mode(&self) -> GateMode {
        match self.phase() {
            GroupPhase::InProgress { .. } => GateMode::Normal,
            GroupPhase::Completed => GateMode::Closed,
            GroupPhase::CompletedEditing => GateMode::Editing,
        }
    }

    pub fn members(&self) -> &[GroupMemberEntity] {
        &self.record.members
    }

    pub fn member(&self, player_id: Uuid) -> Option<&GroupMemberEntity> {
        self.record
            .members
            .iter()
            .find(|member| member.player_id == player_id)
    }

    /// Record to persist after a successful write.
    pub fn next_record(&self, card: &ScoreCard, phase: GroupPhase, version: u64) -> GroupEntity {
        let mut record = self.record.clone();
        record.scores = card
            .rows()
            .map(|(player_id, hole, strokes)| ScoreEntity {
                player_id,
                hole: hole.get(),
                strokes: strokes.get(),
            })
            .collect();
        record.status = if phase.is_completed() {
            GroupStatusEntity::Completed
        } else {
            GroupStatusEntity::Pending
        };
        record.editing = phase.is_editing();
        record.version = version;
        record.updated_at = SystemTime::now();
        record
    }
}

/// Course handicap of a member, if it was recorded within range.
pub fn member_handicap(member: &GroupMemberEntity) -> Option<CourseHandicap> {
    member
        .course_handicap
        .and_then(|value| CourseHandicap::try_from(value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::scorecard::HoleEntry;

    fn record(status: GroupStatusEntity, editing: bool) -> GroupEntity {
        let player_id = Uuid::new_v4();
        GroupEntity {
            id: Uuid::new_v4(),
            tournament_id: Uuid::new_v4(),
            start_hole: 10,
            access_code: "ABCDEF".into(),
            status,
            editing,
            members: vec![GroupMemberEntity {
                player_id,
                course_handicap: Some(12),
                tee_color: "white".into(),
                category: None,
            }],
            scores: Vec::new(),
            version: 3,
            created_at: SystemTime::now(),
            updated_at: SystemTime::now(),
        }
    }

    #[test]
    fn phase_follows_status_and_editing_flag() {
        let pending = GroupRound::try_from(record(GroupStatusEntity::Pending, false)).unwrap();
        assert_eq!(pending.phase(), GroupPhase::INITIAL);
        let done = GroupRound::try_from(record(GroupStatusEntity::Completed, false)).unwrap();
        assert_eq!(done.phase(), GroupPhase::Completed);
        assert_eq!(done.mode(), GateMode::Closed);
        let editing = GroupRound::try_from(record(GroupStatusEntity::Completed, true)).unwrap();
        assert_eq!(editing.phase(), GroupPhase::CompletedEditing);
        assert_eq!(editing.mode(), GateMode::Editing);
    }

    #[test]
    fn next_record_writes_scores_and_version() {
        let round = GroupRound::try_from(record(GroupStatusEntity::Pending, false)).unwrap();
        let player_id = round.members()[0].player_id;
        let confirmation = round
            .gate()
            .confirm_hole(
                0,
                &[HoleEntry {
                    player_id,
                    strokes: Strokes::try_from(4u8).unwrap(),
                }],
                GateMode::Normal,
            )
            .unwrap();

        let next = round.next_record(
            &confirmation.card,
            GroupPhase::InProgress {
                highest_confirmed_step: Some(0),
            },
            4,
        );
        assert_eq!(next.version, 4);
        assert_eq!(next.status, GroupStatusEntity::Pending);
        assert_eq!(
            next.scores,
            vec![ScoreEntity {
                player_id,
                hole: 10,
                strokes: 4
            }]
        );
    }

    #[test]
    fn out_of_range_scores_are_reported_as_corruption() {
        let mut bad = record(GroupStatusEntity::Pending, false);
        bad.scores.push(ScoreEntity {
            player_id: bad.members[0].player_id,
            hole: 19,
            strokes: 4,
        });
        assert!(matches!(
            GroupRound::try_from(bad),
            Err(ServiceError::Corrupted(_))
        ));
    }
}
