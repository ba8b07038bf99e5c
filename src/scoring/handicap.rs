//! Handicap strokes and net scoring.
//!
//! Two net figures coexist on purpose. The leaderboard ranks on the flat round
//! net (`gross - course handicap`), while per-hole net shown on a scorecard uses
//! stroke-index allocation. They are not expected to add up to the same value.

use serde::Deserialize;

use super::values::{CourseHandicap, HOLES_PER_ROUND, StrokeIndex, Strokes};

/// How handicap strokes are spread over the holes of a round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPolicy {
    /// One stroke on every hole whose stroke index is within the handicap.
    #[default]
    Single,
    /// Handicaps above 18 wrap around and grant a second stroke on the hardest holes.
    Full,
}

/// Strokes received on a hole, or `None` when the hole has no stroke index.
pub fn strokes_received(
    handicap: CourseHandicap,
    stroke_index: Option<StrokeIndex>,
    policy: AllocationPolicy,
) -> Option<u8> {
    let index = stroke_index?.get();
    let handicap = handicap.get();
    let received = match policy {
        AllocationPolicy::Single => u8::from(handicap >= index),
        AllocationPolicy::Full => {
            let holes = HOLES_PER_ROUND as u8;
            handicap / holes + u8::from(handicap % holes >= index)
        }
    };
    Some(received)
}

/// Net strokes on one hole, absent when the stroke index is unknown.
pub fn net_for_hole(
    gross: Strokes,
    handicap: CourseHandicap,
    stroke_index: Option<StrokeIndex>,
    policy: AllocationPolicy,
) -> Option<i32> {
    strokes_received(handicap, stroke_index, policy)
        .map(|received| i32::from(gross.get()) - i32::from(received))
}

/// Round net used for ranking: the whole course handicap off the gross total.
///
/// A player without a handicap on record plays off scratch.
pub fn net_total(gross_total: u32, handicap: Option<CourseHandicap>) -> i32 {
    let handicap = handicap.unwrap_or(CourseHandicap::ZERO);
    gross_total as i32 - i32::from(handicap.get())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handicap(n: u8) -> CourseHandicap {
        CourseHandicap::try_from(n).unwrap()
    }

    fn index(n: u8) -> Option<StrokeIndex> {
        Some(StrokeIndex::try_from(n).unwrap())
    }

    #[test]
    fn flat_net_subtracts_full_handicap() {
        assert_eq!(net_total(80, Some(handicap(10))), 70);
    }

    #[test]
    fn missing_handicap_plays_off_scratch() {
        assert_eq!(net_total(75, None), 75);
    }

    #[test]
    fn single_allocation_gives_one_stroke_up_to_handicap() {
        let policy = AllocationPolicy::Single;
        assert_eq!(strokes_received(handicap(10), index(10), policy), Some(1));
        assert_eq!(strokes_received(handicap(10), index(11), policy), Some(0));
        assert_eq!(strokes_received(handicap(0), index(1), policy), Some(0));
        assert_eq!(strokes_received(handicap(24), index(1), policy), Some(1));
    }

    #[test]
    fn full_allocation_wraps_above_eighteen() {
        let policy = AllocationPolicy::Full;
        assert_eq!(strokes_received(handicap(24), index(6), policy), Some(2));
        assert_eq!(strokes_received(handicap(24), index(7), policy), Some(1));
        assert_eq!(strokes_received(handicap(18), index(18), policy), Some(1));
        assert_eq!(strokes_received(handicap(36), index(18), policy), Some(2));
    }

    #[test]
    fn per_hole_net_is_absent_without_stroke_index() {
        let gross = Strokes::try_from(5u8).unwrap();
        assert_eq!(
            net_for_hole(gross, handicap(12), None, AllocationPolicy::Single),
            None
        );
        assert_eq!(
            net_for_hole(gross, handicap(12), index(3), AllocationPolicy::Single),
            Some(4)
        );
    }
}
