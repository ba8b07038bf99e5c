//! Shotgun-start play order.

use super::values::{HOLES_PER_ROUND, HoleNumber};

/// Index into the play order of a group (0 = first hole played, 17 = last).
pub type Step = usize;

/// Last step of a round.
pub const LAST_STEP: Step = HOLES_PER_ROUND - 1;

/// Holes in play order for a group teeing off at `start`, wrapping from 18 back to 1.
pub fn hole_sequence(start: HoleNumber) -> [HoleNumber; HOLES_PER_ROUND] {
    let mut holes = [start; HOLES_PER_ROUND];
    for (step, slot) in holes.iter_mut().enumerate() {
        *slot = hole_at(start, step);
    }
    holes
}

/// Hole played at `step` for a group teeing off at `start`.
pub fn hole_at(start: HoleNumber, step: Step) -> HoleNumber {
    HoleNumber::from_index(start.index() + step)
}

/// Position of `hole` in the play order of a group teeing off at `start`.
pub fn step_of(start: HoleNumber, hole: HoleNumber) -> Step {
    (hole.index() + HOLES_PER_ROUND - start.index()) % HOLES_PER_ROUND
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn hole(n: u8) -> HoleNumber {
        HoleNumber::try_from(n).unwrap()
    }

    #[test]
    fn every_start_yields_a_wrapping_permutation() {
        for start in HoleNumber::all() {
            let sequence = hole_sequence(start);
            assert_eq!(sequence[0], start);

            let distinct: HashSet<_> = sequence.iter().copied().collect();
            assert_eq!(distinct.len(), HOLES_PER_ROUND);

            for pair in sequence.windows(2) {
                let expected = pair[0].get() % 18 + 1;
                assert_eq!(pair[1].get(), expected);
            }
        }
    }

    #[test]
    fn start_on_ten_wraps_after_eighteen() {
        let sequence: Vec<u8> = hole_sequence(hole(10)).iter().map(|h| h.get()).collect();
        assert_eq!(
            sequence,
            vec![10, 11, 12, 13, 14, 15, 16, 17, 18, 1, 2, 3, 4, 5, 6, 7, 8, 9]
        );
    }

    #[test]
    fn sequence_is_reproducible() {
        assert_eq!(hole_sequence(hole(7)), hole_sequence(hole(7)));
    }

    #[test]
    fn step_of_inverts_hole_at() {
        for start in HoleNumber::all() {
            for step in 0..HOLES_PER_ROUND {
                assert_eq!(step_of(start, hole_at(start, step)), step);
            }
        }
        assert_eq!(step_of(hole(10), hole(1)), 9);
        assert_eq!(step_of(hole(1), hole(18)), LAST_STEP);
    }
}
