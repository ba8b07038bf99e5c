use std::time::Instant;

use thiserror::Error;
use uuid::Uuid;

use crate::scoring::sequence::{LAST_STEP, Step};

/// Lifecycle of one group's scorecard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupPhase {
    /// Holes are being confirmed one by one.
    InProgress {
        /// Highest step whose prefix is fully confirmed (`None` before the first hole).
        highest_confirmed_step: Option<Step>,
    },
    /// All 18 holes confirmed and the card closed.
    Completed,
    /// A completed card re-opened for review; every hole may be rewritten.
    CompletedEditing,
}

impl GroupPhase {
    /// Phase of a group nobody has scored yet.
    pub const INITIAL: GroupPhase = GroupPhase::InProgress {
        highest_confirmed_step: None,
    };

    /// Whether the card has been closed, editing or not.
    pub fn is_completed(&self) -> bool {
        matches!(self, GroupPhase::Completed | GroupPhase::CompletedEditing)
    }

    /// Whether every hole is freely editable.
    pub fn is_editing(&self) -> bool {
        matches!(self, GroupPhase::CompletedEditing)
    }
}

/// Events that can be applied to a group state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupEvent {
    /// A hole was confirmed; carries the highest confirmed step recomputed after the write.
    HoleConfirmed {
        /// Step that was confirmed.
        step: Step,
        /// Highest confirmed step after the write.
        highest_confirmed_step: Option<Step>,
    },
    /// Scorer closes the card.
    Finish,
    /// Card re-opened for review.
    Reopen,
    /// Review finished; the card closes again.
    SaveEdits,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the state machine was in when the invalid event was received.
    pub from: GroupPhase,
    /// The event that cannot be applied from this phase.
    pub event: GroupEvent,
}

/// Errors that can occur when planning a state machine transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// A transition is already pending and must be applied or aborted.
    AlreadyPending,
    /// The requested transition is not valid from the current phase.
    InvalidTransition(InvalidTransition),
}

/// Errors that can occur when applying a planned state machine transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    /// No transition is currently pending.
    NoPending,
    /// Plan ID does not match the pending plan.
    IdMismatch {
        /// Expected plan ID.
        expected: PlanId,
        /// Provided plan ID.
        got: PlanId,
    },
    /// State machine phase changed since the plan was created.
    PhaseMismatch {
        /// Phase when plan was created.
        expected: GroupPhase,
        /// Current phase.
        actual: GroupPhase,
    },
    /// State machine version changed since the plan was created.
    VersionMismatch {
        /// Version when plan was created.
        expected: u64,
        /// Current version.
        actual: u64,
    },
}

/// Errors that can occur when aborting a planned state machine transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortError {
    /// No transition is currently pending.
    NoPending,
    /// Plan ID does not match the pending plan.
    IdMismatch {
        /// Expected plan ID.
        expected: PlanId,
        /// Provided plan ID.
        got: PlanId,
    },
}

/// Unique identifier for a planned state transition.
pub type PlanId = Uuid;

/// A planned state machine transition that has been validated but not yet applied.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Unique identifier for this plan.
    pub id: PlanId,
    /// Phase the state machine is currently in.
    pub from: GroupPhase,
    /// Phase the state machine will transition to.
    pub to: GroupPhase,
    /// Event that triggered this transition.
    pub event: GroupEvent,
    /// Version number after applying this transition.
    pub version_next: u64,
    /// Timestamp when this plan was created.
    pub pending_since: Instant,
}

/// Snapshot of the current state machine state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Current phase of the state machine.
    pub phase: GroupPhase,
    /// Version number of the state machine (increments on each transition).
    pub version: u64,
    /// Pending transition phase, if a transition is planned but not yet applied.
    pub pending: Option<GroupPhase>,
}

/// State machine for a single group's card.
///
/// The version mirrors the version of the persisted group record, so a plan's
/// `version_next` is exactly the version the store write must produce.
#[derive(Debug, Clone)]
pub struct GroupStateMachine {
    phase: GroupPhase,
    version: u64,
    pending: Option<Plan>,
}

impl Default for GroupStateMachine {
    fn default() -> Self {
        Self {
            phase: GroupPhase::INITIAL,
            version: 0,
            pending: None,
        }
    }
}

impl GroupStateMachine {
    /// Create a new state machine for a group nobody has scored yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-align the machine with the persisted record, discarding any stale plan.
    pub fn restore(&mut self, phase: GroupPhase, version: u64) {
        self.phase = phase;
        self.version = version;
        self.pending = None;
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> GroupPhase {
        self.phase
    }

    /// Current version.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Create a snapshot of the current state machine state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            version: self.version,
            pending: self.pending.as_ref().map(|plan| plan.to),
        }
    }

    /// Plan a transition by validating that the event can be applied from the current phase.
    /// Returns a Plan that can later be applied or aborted.
    pub fn plan(&mut self, event: GroupEvent) -> Result<Plan, PlanError> {
        if self.pending.is_some() {
            return Err(PlanError::AlreadyPending);
        }

        let next = self
            .compute_transition(event)
            .map_err(PlanError::InvalidTransition)?;

        let plan = Plan {
            id: Uuid::new_v4(),
            from: self.phase,
            to: next,
            event,
            version_next: self.version + 1,
            pending_since: Instant::now(),
        };

        self.pending = Some(plan.clone());

        Ok(plan)
    }

    /// Apply a planned transition, moving the state machine to the next phase.
    /// Returns the new phase after the transition.
    pub fn apply(&mut self, plan_id: PlanId) -> Result<GroupPhase, ApplyError> {
        let plan = self.pending.take().ok_or(ApplyError::NoPending)?;

        if plan.id != plan_id {
            let expected_plan_id = plan.id;
            self.pending = Some(plan);
            return Err(ApplyError::IdMismatch {
                expected: expected_plan_id,
                got: plan_id,
            });
        }

        if self.phase != plan.from {
            return Err(ApplyError::PhaseMismatch {
                expected: plan.from,
                actual: self.phase,
            });
        }

        if self.version + 1 != plan.version_next {
            return Err(ApplyError::VersionMismatch {
                expected: plan.version_next,
                actual: self.version + 1,
            });
        }

        self.phase = plan.to;
        self.version = plan.version_next;

        Ok(self.phase)
    }

    /// Abort a planned transition without applying it, returning the state machine to its previous state.
    pub fn abort(&mut self, plan_id: PlanId) -> Result<(), AbortError> {
        let plan = self.pending.as_ref().ok_or(AbortError::NoPending)?;

        if plan.id != plan_id {
            return Err(AbortError::IdMismatch {
                expected: plan.id,
                got: plan_id,
            });
        }

        self.pending = None;
        Ok(())
    }

    /// Compute a transition from an event if the transition is valid.
    fn compute_transition(&self, event: GroupEvent) -> Result<GroupPhase, InvalidTransition> {
        let next = match (self.phase, event) {
            (
                GroupPhase::InProgress { .. },
                GroupEvent::HoleConfirmed {
                    highest_confirmed_step,
                    ..
                },
            ) => {
                if highest_confirmed_step == Some(LAST_STEP) {
                    GroupPhase::Completed
                } else {
                    GroupPhase::InProgress {
                        highest_confirmed_step,
                    }
                }
            }
            (
                GroupPhase::InProgress {
                    highest_confirmed_step: Some(LAST_STEP),
                },
                GroupEvent::Finish,
            ) => GroupPhase::Completed,
            (GroupPhase::Completed, GroupEvent::Finish) => GroupPhase::Completed,
            (GroupPhase::Completed, GroupEvent::Reopen) => GroupPhase::CompletedEditing,
            (GroupPhase::CompletedEditing, GroupEvent::HoleConfirmed { .. }) => {
                GroupPhase::CompletedEditing
            }
            (GroupPhase::CompletedEditing, GroupEvent::Reopen) => GroupPhase::CompletedEditing,
            (GroupPhase::CompletedEditing, GroupEvent::SaveEdits) => GroupPhase::Completed,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(sm: &mut GroupStateMachine, event: GroupEvent) -> GroupPhase {
        let plan = sm.plan(event).unwrap();
        sm.apply(plan.id).unwrap()
    }

    fn confirmed(step: Step) -> GroupEvent {
        GroupEvent::HoleConfirmed {
            step,
            highest_confirmed_step: Some(step),
        }
    }

    #[test]
    fn initial_state_has_nothing_confirmed() {
        let sm = GroupStateMachine::new();
        assert_eq!(sm.phase(), GroupPhase::INITIAL);
        assert_eq!(sm.version(), 0);
    }

    #[test]
    fn full_round_completes_after_last_step() {
        let mut sm = GroupStateMachine::new();

        for step in 0..LAST_STEP {
            assert_eq!(
                apply(&mut sm, confirmed(step)),
                GroupPhase::InProgress {
                    highest_confirmed_step: Some(step)
                }
            );
        }

        assert_eq!(apply(&mut sm, confirmed(LAST_STEP)), GroupPhase::Completed);
        assert_eq!(sm.version(), 18);
    }

    #[test]
    fn review_cycle_returns_to_completed() {
        let mut sm = GroupStateMachine::new();
        sm.restore(GroupPhase::Completed, 18);

        assert_eq!(
            apply(&mut sm, GroupEvent::Reopen),
            GroupPhase::CompletedEditing
        );
        assert_eq!(
            apply(&mut sm, confirmed(LAST_STEP)),
            GroupPhase::CompletedEditing
        );
        assert_eq!(apply(&mut sm, GroupEvent::SaveEdits), GroupPhase::Completed);
        assert_eq!(sm.version(), 21);
    }

    #[test]
    fn finishing_an_unfinished_round_is_invalid() {
        let mut sm = GroupStateMachine::new();
        sm.restore(
            GroupPhase::InProgress {
                highest_confirmed_step: Some(4),
            },
            5,
        );

        match sm.plan(GroupEvent::Finish).unwrap_err() {
            PlanError::InvalidTransition(invalid) => {
                assert_eq!(invalid.event, GroupEvent::Finish);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn saving_edits_requires_editing_mode() {
        let mut sm = GroupStateMachine::new();
        sm.restore(GroupPhase::Completed, 18);
        assert!(matches!(
            sm.plan(GroupEvent::SaveEdits),
            Err(PlanError::InvalidTransition(_))
        ));
    }

    #[test]
    fn completed_card_rejects_confirmations_until_reopened() {
        let mut sm = GroupStateMachine::new();
        sm.restore(GroupPhase::Completed, 18);

        assert!(matches!(
            sm.plan(confirmed(3)),
            Err(PlanError::InvalidTransition(_))
        ));
    }

    #[test]
    fn second_plan_while_pending_is_refused() {
        let mut sm = GroupStateMachine::new();
        sm.plan(confirmed(0)).unwrap();
        assert_eq!(sm.plan(confirmed(0)).unwrap_err(), PlanError::AlreadyPending);
    }

    #[test]
    fn abort_clears_pending() {
        let mut sm = GroupStateMachine::new();
        let plan = sm.plan(confirmed(0)).unwrap();
        sm.abort(plan.id).unwrap();
        assert!(sm.pending.is_none());
        assert_eq!(sm.snapshot().pending, None);
        assert_eq!(sm.phase(), GroupPhase::INITIAL);
    }

    #[test]
    fn apply_with_foreign_plan_id_keeps_pending() {
        let mut sm = GroupStateMachine::new();
        let plan = sm.plan(confirmed(0)).unwrap();
        let err = sm.apply(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ApplyError::IdMismatch { .. }));
        assert_eq!(sm.apply(plan.id).unwrap(), GroupPhase::InProgress {
            highest_confirmed_step: Some(0)
        });
    }
}
