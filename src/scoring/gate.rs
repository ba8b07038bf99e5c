//! Progression gate deciding which step a group may score next and which holes are locked.
//!
//! Progress is never stored on its own: the highest confirmed step is always
//! recomputed from the strokes held in the [`ScoreCard`], scanning the play
//! order from the first tee until a hole is missing a value.

use thiserror::Error;
use uuid::Uuid;

use super::{
    scorecard::{HoleEntry, ScoreCard, ScoreCardError},
    sequence::{LAST_STEP, Step, hole_at, hole_sequence},
    values::{HOLES_PER_ROUND, HoleNumber},
};

/// Whether the scorer follows the normal hole-by-hole flow or reviews a finished card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateMode {
    /// Sequential entry; earlier holes are locked.
    Normal,
    /// Post-completion review; every hole may be rewritten.
    Editing,
    /// Finished card that has not been re-opened; every hole is locked.
    Closed,
}

/// Reasons a hole confirmation is refused. None of them mutate the card.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// Step is outside `0..=17`.
    #[error("step {step} is out of range")]
    StepOutOfRange {
        /// Requested step.
        step: Step,
    },
    /// Step lies beyond the step currently open for entry.
    #[error("hole {hole} is out of range: current hole is {current_hole}")]
    OutOfSequence {
        /// Requested hole.
        hole: HoleNumber,
        /// Hole currently open for entry.
        current_hole: HoleNumber,
    },
    /// Some members have no value for the hole.
    #[error("incomplete hole {hole}: fill in every player's score before confirming")]
    Incomplete {
        /// Hole being confirmed.
        hole: HoleNumber,
        /// Members still missing a value.
        missing: Vec<Uuid>,
    },
    /// Hole is locked and the submission differs from the confirmed values.
    #[error("hole {hole} is already confirmed with different scores")]
    Locked {
        /// Locked hole.
        hole: HoleNumber,
    },
    /// Submission references players outside the group.
    #[error(transparent)]
    Card(#[from] ScoreCardError),
}

/// Effect a successful confirmation had on the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Progress moved forward.
    Advanced,
    /// Values changed on an already confirmed hole.
    Updated,
    /// Submission matched what was already stored.
    Unchanged,
}

/// Result of a successful confirmation, ready to be persisted.
#[derive(Debug, Clone)]
pub struct HoleConfirmation {
    /// Step that was confirmed.
    pub step: Step,
    /// Hole that was confirmed.
    pub hole: HoleNumber,
    /// Card including the confirmed values.
    pub card: ScoreCard,
    /// Highest confirmed step after the write.
    pub highest_confirmed_step: Option<Step>,
    /// What changed.
    pub outcome: ConfirmOutcome,
}

/// Read-only view of a group's progress over its [`ScoreCard`].
#[derive(Debug, Clone, Copy)]
pub struct ProgressionGate<'a> {
    start: HoleNumber,
    card: &'a ScoreCard,
}

impl<'a> ProgressionGate<'a> {
    /// Gate for a group teeing off at `start`.
    pub fn new(start: HoleNumber, card: &'a ScoreCard) -> Self {
        Self { start, card }
    }

    /// Play order of the group.
    pub fn sequence(&self) -> [HoleNumber; HOLES_PER_ROUND] {
        hole_sequence(self.start)
    }

    /// Hole played at `step`.
    pub fn hole_at(&self, step: Step) -> HoleNumber {
        hole_at(self.start, step)
    }

    /// Largest step `k` such that every hole at steps `0..=k` is complete.
    pub fn highest_confirmed_step(&self) -> Option<Step> {
        self.sequence()
            .iter()
            .take_while(|hole| self.card.hole_complete(**hole))
            .count()
            .checked_sub(1)
    }

    /// Next playable step, capped at the last hole.
    pub fn current_step(&self) -> Step {
        next_step(self.highest_confirmed_step()).min(LAST_STEP)
    }

    /// Whether all 18 holes are confirmed.
    pub fn round_complete(&self) -> bool {
        self.highest_confirmed_step() == Some(LAST_STEP)
    }

    /// Clamp a requested step to what the mode allows.
    pub fn navigate(&self, step: Step, mode: GateMode) -> Step {
        let upper = match mode {
            GateMode::Normal | GateMode::Closed => self.current_step(),
            GateMode::Editing => LAST_STEP,
        };
        step.min(upper)
    }

    /// Locked holes show their values but reject changes through the normal flow.
    pub fn is_locked(&self, step: Step, mode: GateMode) -> bool {
        match mode {
            GateMode::Editing => false,
            GateMode::Closed => true,
            GateMode::Normal => self
                .highest_confirmed_step()
                .is_some_and(|highest| step < highest),
        }
    }

    /// Validate and merge a submission for the hole at `step`.
    ///
    /// Submitted values are merged with what the card already holds for that hole;
    /// the merged hole must have a value for every member.
    pub fn confirm_hole(
        &self,
        step: Step,
        submitted: &[HoleEntry],
        mode: GateMode,
    ) -> Result<HoleConfirmation, GateError> {
        if step > LAST_STEP {
            return Err(GateError::StepOutOfRange { step });
        }

        let hole = self.hole_at(step);
        if mode == GateMode::Normal && step > self.current_step() {
            return Err(GateError::OutOfSequence {
                hole,
                current_hole: self.hole_at(self.current_step()),
            });
        }

        let mut card = self.card.clone();
        card.upsert_hole(hole, submitted)?;

        let missing = card.missing_players(hole);
        if !missing.is_empty() {
            return Err(GateError::Incomplete { hole, missing });
        }

        let unchanged = card == *self.card;
        if self.is_locked(step, mode) && !unchanged {
            return Err(GateError::Locked { hole });
        }

        let before = self.highest_confirmed_step();
        let after = ProgressionGate::new(self.start, &card).highest_confirmed_step();
        let outcome = if unchanged {
            ConfirmOutcome::Unchanged
        } else if next_step(after) > next_step(before) {
            ConfirmOutcome::Advanced
        } else {
            ConfirmOutcome::Updated
        };

        Ok(HoleConfirmation {
            step,
            hole,
            card,
            highest_confirmed_step: after,
            outcome,
        })
    }
}

fn next_step(highest: Option<Step>) -> Step {
    highest.map_or(0, |step| step + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::values::Strokes;

    fn hole(n: u8) -> HoleNumber {
        HoleNumber::try_from(n).unwrap()
    }

    fn entry(player_id: Uuid, n: u8) -> HoleEntry {
        HoleEntry {
            player_id,
            strokes: Strokes::try_from(n).unwrap(),
        }
    }

    fn confirm(card: &mut ScoreCard, start: HoleNumber, step: Step, entries: &[HoleEntry]) {
        let confirmation = ProgressionGate::new(start, card)
            .confirm_hole(step, entries, GateMode::Normal)
            .unwrap();
        *card = confirmation.card;
    }

    #[test]
    fn fresh_card_starts_at_step_zero() {
        let card = ScoreCard::new(vec![Uuid::new_v4()]);
        let gate = ProgressionGate::new(hole(5), &card);
        assert_eq!(gate.highest_confirmed_step(), None);
        assert_eq!(gate.current_step(), 0);
        assert_eq!(gate.hole_at(gate.current_step()), hole(5));
    }

    #[test]
    fn incomplete_hole_is_rejected_with_missing_players() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let card = ScoreCard::new(vec![a, b]);
        let gate = ProgressionGate::new(hole(10), &card);

        let err = gate
            .confirm_hole(0, &[entry(a, 4)], GateMode::Normal)
            .unwrap_err();
        assert_eq!(
            err,
            GateError::Incomplete {
                hole: hole(10),
                missing: vec![b],
            }
        );
        assert_eq!(gate.current_step(), 0);
        assert_eq!(card.rows().count(), 0);
    }

    #[test]
    fn confirmation_advances_one_step() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let card = ScoreCard::new(vec![a, b]);
        let gate = ProgressionGate::new(hole(10), &card);

        let confirmation = gate
            .confirm_hole(0, &[entry(a, 4), entry(b, 5)], GateMode::Normal)
            .unwrap();
        assert_eq!(confirmation.outcome, ConfirmOutcome::Advanced);
        assert_eq!(confirmation.highest_confirmed_step, Some(0));
        assert_eq!(
            ProgressionGate::new(hole(10), &confirmation.card).current_step(),
            1
        );
    }

    #[test]
    fn repeating_a_confirmation_is_idempotent() {
        let a = Uuid::new_v4();
        let mut card = ScoreCard::new(vec![a]);
        confirm(&mut card, hole(1), 0, &[entry(a, 3)]);

        let again = ProgressionGate::new(hole(1), &card)
            .confirm_hole(0, &[entry(a, 3)], GateMode::Normal)
            .unwrap();
        assert_eq!(again.outcome, ConfirmOutcome::Unchanged);
        assert_eq!(again.highest_confirmed_step, Some(0));
        assert_eq!(again.card.rows().count(), 1);
    }

    #[test]
    fn skipping_ahead_is_out_of_sequence() {
        let a = Uuid::new_v4();
        let card = ScoreCard::new(vec![a]);
        let err = ProgressionGate::new(hole(1), &card)
            .confirm_hole(2, &[entry(a, 3)], GateMode::Normal)
            .unwrap_err();
        assert_eq!(
            err,
            GateError::OutOfSequence {
                hole: hole(3),
                current_hole: hole(1),
            }
        );
    }

    #[test]
    fn step_beyond_round_is_out_of_range() {
        let card = ScoreCard::new(vec![Uuid::new_v4()]);
        let err = ProgressionGate::new(hole(1), &card)
            .confirm_hole(18, &[], GateMode::Editing)
            .unwrap_err();
        assert_eq!(err, GateError::StepOutOfRange { step: 18 });
    }

    #[test]
    fn earlier_holes_lock_in_normal_mode() {
        let a = Uuid::new_v4();
        let mut card = ScoreCard::new(vec![a]);
        for step in 0..3 {
            confirm(&mut card, hole(1), step, &[entry(a, 4)]);
        }

        let gate = ProgressionGate::new(hole(1), &card);
        assert_eq!(gate.highest_confirmed_step(), Some(2));
        assert!(gate.is_locked(0, GateMode::Normal));
        assert!(gate.is_locked(1, GateMode::Normal));
        assert!(!gate.is_locked(2, GateMode::Normal));
        assert!(!gate.is_locked(0, GateMode::Editing));

        assert_eq!(
            gate.confirm_hole(0, &[entry(a, 5)], GateMode::Normal)
                .unwrap_err(),
            GateError::Locked { hole: hole(1) }
        );
        assert_eq!(
            gate.confirm_hole(0, &[entry(a, 4)], GateMode::Normal)
                .unwrap()
                .outcome,
            ConfirmOutcome::Unchanged
        );

        let edited = gate
            .confirm_hole(0, &[entry(a, 5)], GateMode::Editing)
            .unwrap();
        assert_eq!(edited.outcome, ConfirmOutcome::Updated);
        assert_eq!(edited.card.strokes(a, hole(1)).map(Strokes::get), Some(5));
    }

    #[test]
    fn closed_card_locks_every_hole() {
        let a = Uuid::new_v4();
        let mut card = ScoreCard::new(vec![a]);
        for step in 0..=LAST_STEP {
            confirm(&mut card, hole(1), step, &[entry(a, 4)]);
        }

        let gate = ProgressionGate::new(hole(1), &card);
        assert!(!gate.is_locked(LAST_STEP, GateMode::Normal));
        assert!(gate.is_locked(LAST_STEP, GateMode::Closed));
        assert_eq!(gate.navigate(40, GateMode::Closed), LAST_STEP);

        assert_eq!(
            gate.confirm_hole(LAST_STEP, &[entry(a, 6)], GateMode::Closed)
                .unwrap_err(),
            GateError::Locked { hole: hole(18) }
        );
        assert_eq!(
            gate.confirm_hole(LAST_STEP, &[entry(a, 4)], GateMode::Closed)
                .unwrap()
                .outcome,
            ConfirmOutcome::Unchanged
        );
    }

    #[test]
    fn navigation_is_clamped_by_mode() {
        let a = Uuid::new_v4();
        let mut card = ScoreCard::new(vec![a]);
        confirm(&mut card, hole(1), 0, &[entry(a, 4)]);

        let gate = ProgressionGate::new(hole(1), &card);
        assert_eq!(gate.navigate(0, GateMode::Normal), 0);
        assert_eq!(gate.navigate(1, GateMode::Normal), 1);
        assert_eq!(gate.navigate(9, GateMode::Normal), 1);
        assert_eq!(gate.navigate(9, GateMode::Editing), 9);
        assert_eq!(gate.navigate(40, GateMode::Editing), LAST_STEP);
    }

    #[test]
    fn current_step_is_capped_at_last_hole() {
        let a = Uuid::new_v4();
        let mut card = ScoreCard::new(vec![a]);
        for step in 0..=LAST_STEP {
            confirm(&mut card, hole(4), step, &[entry(a, 4)]);
        }

        let gate = ProgressionGate::new(hole(4), &card);
        assert!(gate.round_complete());
        assert_eq!(gate.highest_confirmed_step(), Some(LAST_STEP));
        assert_eq!(gate.current_step(), LAST_STEP);
    }
}
