//! Course layout: the 18 holes with par and stroke index.

use thiserror::Error;

use super::values::{HOLES_PER_ROUND, HoleNumber, Par, StrokeIndex, ValueError};

/// Scoring attributes of one hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoleSpec {
    /// Official hole number.
    pub number: HoleNumber,
    /// Par of the hole.
    pub par: Par,
    /// Handicap difficulty rank, when published.
    pub stroke_index: Option<StrokeIndex>,
}

/// Reasons a set of holes does not form a playable course.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CourseError {
    #[error("a course has exactly 18 holes (got {0})")]
    HoleCount(usize),
    #[error("hole {0} is listed more than once")]
    DuplicateHole(HoleNumber),
    #[error("stroke index {0} is assigned to more than one hole")]
    DuplicateStrokeIndex(StrokeIndex),
    #[error("hole {0} has no stroke index")]
    MissingStrokeIndex(HoleNumber),
    #[error(transparent)]
    Value(#[from] ValueError),
}

/// Eighteen holes in official order.
///
/// Stroke indexes may be partially missing while a course is being set up, but
/// the ones present are always distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseLayout {
    holes: [HoleSpec; HOLES_PER_ROUND],
}

impl CourseLayout {
    /// Validate holes given in any order.
    pub fn new(mut holes: Vec<HoleSpec>) -> Result<Self, CourseError> {
        if holes.len() != HOLES_PER_ROUND {
            return Err(CourseError::HoleCount(holes.len()));
        }

        holes.sort_by_key(|hole| hole.number);
        for pair in holes.windows(2) {
            if pair[0].number == pair[1].number {
                return Err(CourseError::DuplicateHole(pair[0].number));
            }
        }

        let mut indexes: Vec<StrokeIndex> =
            holes.iter().filter_map(|hole| hole.stroke_index).collect();
        indexes.sort();
        for pair in indexes.windows(2) {
            if pair[0] == pair[1] {
                return Err(CourseError::DuplicateStrokeIndex(pair[0]));
            }
        }

        let holes: [HoleSpec; HOLES_PER_ROUND] = holes
            .try_into()
            .map_err(|rest: Vec<HoleSpec>| CourseError::HoleCount(rest.len()))?;
        Ok(Self { holes })
    }

    /// Attributes of hole `number`.
    pub fn hole(&self, number: HoleNumber) -> &HoleSpec {
        &self.holes[number.index()]
    }

    /// Pars in official order.
    pub fn pars(&self) -> [Par; HOLES_PER_ROUND] {
        self.holes.map(|hole| hole.par)
    }

    /// Sum of all pars.
    pub fn total_par(&self) -> u32 {
        self.holes.iter().map(|hole| u32::from(hole.par.get())).sum()
    }

    /// Every hole carries a stroke index; together they are a permutation of 1..18.
    pub fn ensure_stroke_index_complete(&self) -> Result<(), CourseError> {
        match self.holes.iter().find(|hole| hole.stroke_index.is_none()) {
            Some(hole) => Err(CourseError::MissingStrokeIndex(hole.number)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(number: u8, par: u8, stroke_index: Option<u8>) -> HoleSpec {
        HoleSpec {
            number: HoleNumber::try_from(number).unwrap(),
            par: Par::try_from(par).unwrap(),
            stroke_index: stroke_index.map(|si| StrokeIndex::try_from(si).unwrap()),
        }
    }

    fn standard() -> Vec<HoleSpec> {
        (1..=18).rev().map(|n| spec(n, 4, Some(19 - n))).collect()
    }

    #[test]
    fn holes_are_sorted_into_official_order() {
        let layout = CourseLayout::new(standard()).unwrap();
        assert_eq!(layout.hole(HoleNumber::try_from(1u8).unwrap()).number.get(), 1);
        assert_eq!(layout.total_par(), 72);
        assert!(layout.ensure_stroke_index_complete().is_ok());
    }

    #[test]
    fn wrong_hole_count_is_rejected() {
        let mut holes = standard();
        holes.pop();
        assert_eq!(
            CourseLayout::new(holes).unwrap_err(),
            CourseError::HoleCount(17)
        );
    }

    #[test]
    fn duplicate_hole_numbers_are_rejected() {
        let mut holes = standard();
        holes[0] = spec(1, 4, None);
        assert!(matches!(
            CourseLayout::new(holes),
            Err(CourseError::DuplicateHole(_))
        ));
    }

    #[test]
    fn duplicate_stroke_indexes_are_rejected() {
        let mut holes = standard();
        holes[0] = spec(18, 4, Some(2));
        assert!(matches!(
            CourseLayout::new(holes),
            Err(CourseError::DuplicateStrokeIndex(_))
        ));
    }

    #[test]
    fn partial_stroke_indexes_are_allowed_until_finalized() {
        let mut holes = standard();
        holes[3] = spec(15, 3, None);
        let layout = CourseLayout::new(holes).unwrap();
        assert_eq!(
            layout.ensure_stroke_index_complete().unwrap_err(),
            CourseError::MissingStrokeIndex(HoleNumber::try_from(15u8).unwrap())
        );
    }
}
