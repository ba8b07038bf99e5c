//! Per-group store of entered strokes.

use std::collections::{BTreeMap, HashSet};

use thiserror::Error;
use uuid::Uuid;

use super::values::{HoleNumber, Strokes};

/// Strokes entered for one player on one hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoleEntry {
    /// Player the strokes belong to.
    pub player_id: Uuid,
    /// Strokes played.
    pub strokes: Strokes,
}

/// Errors raised when writing to a [`ScoreCard`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreCardError {
    /// Player is not a member of the group.
    #[error("player `{0}` is not a member of this group")]
    UnknownPlayer(Uuid),
    /// Player appears more than once in the same hole submission.
    #[error("player `{0}` appears more than once for the same hole")]
    DuplicatePlayer(Uuid),
}

/// Strokes entered by a group, keyed by player and hole.
///
/// At most one value exists per `(player, hole)`; writing again overwrites it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreCard {
    members: Vec<Uuid>,
    strokes: BTreeMap<(Uuid, HoleNumber), Strokes>,
}

impl ScoreCard {
    /// Empty card for the given ordered members.
    pub fn new(members: Vec<Uuid>) -> Self {
        Self {
            members,
            strokes: BTreeMap::new(),
        }
    }

    /// Rebuild a card from persisted `(player, hole, strokes)` rows.
    pub fn from_rows(
        members: Vec<Uuid>,
        rows: impl IntoIterator<Item = (Uuid, HoleNumber, Strokes)>,
    ) -> Result<Self, ScoreCardError> {
        let mut card = Self::new(members);
        for (player_id, hole, strokes) in rows {
            if !card.is_member(player_id) {
                return Err(ScoreCardError::UnknownPlayer(player_id));
            }
            card.strokes.insert((player_id, hole), strokes);
        }
        Ok(card)
    }

    /// Ordered member list.
    pub fn members(&self) -> &[Uuid] {
        &self.members
    }

    /// Whether `player_id` belongs to the group.
    pub fn is_member(&self, player_id: Uuid) -> bool {
        self.members.contains(&player_id)
    }

    /// Strokes entered for a player on a hole.
    pub fn strokes(&self, player_id: Uuid, hole: HoleNumber) -> Option<Strokes> {
        self.strokes.get(&(player_id, hole)).copied()
    }

    /// A hole is complete once every member has a value for it.
    pub fn hole_complete(&self, hole: HoleNumber) -> bool {
        self.members
            .iter()
            .all(|player_id| self.strokes.contains_key(&(*player_id, hole)))
    }

    /// Members without a value on `hole`, in member order.
    pub fn missing_players(&self, hole: HoleNumber) -> Vec<Uuid> {
        self.members
            .iter()
            .filter(|player_id| !self.strokes.contains_key(&(**player_id, hole)))
            .copied()
            .collect()
    }

    /// Values entered on `hole`, in member order.
    pub fn hole_entries(&self, hole: HoleNumber) -> Vec<HoleEntry> {
        self.members
            .iter()
            .filter_map(|player_id| {
                self.strokes(*player_id, hole).map(|strokes| HoleEntry {
                    player_id: *player_id,
                    strokes,
                })
            })
            .collect()
    }

    /// Write every entry for `hole` or none of them.
    pub fn upsert_hole(
        &mut self,
        hole: HoleNumber,
        entries: &[HoleEntry],
    ) -> Result<(), ScoreCardError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in entries {
            if !self.is_member(entry.player_id) {
                return Err(ScoreCardError::UnknownPlayer(entry.player_id));
            }
            if !seen.insert(entry.player_id) {
                return Err(ScoreCardError::DuplicatePlayer(entry.player_id));
            }
        }

        for entry in entries {
            self.strokes.insert((entry.player_id, hole), entry.strokes);
        }
        Ok(())
    }

    /// Holes scored by a player, in official 1..18 order.
    pub fn player_holes(&self, player_id: Uuid) -> Vec<(HoleNumber, Strokes)> {
        HoleNumber::all()
            .filter_map(|hole| self.strokes(player_id, hole).map(|strokes| (hole, strokes)))
            .collect()
    }

    /// Every stored value as `(player, hole, strokes)` rows.
    pub fn rows(&self) -> impl Iterator<Item = (Uuid, HoleNumber, Strokes)> + '_ {
        self.strokes
            .iter()
            .map(|((player_id, hole), strokes)| (*player_id, *hole, *strokes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hole(n: u8) -> HoleNumber {
        HoleNumber::try_from(n).unwrap()
    }

    fn strokes(n: u8) -> Strokes {
        Strokes::try_from(n).unwrap()
    }

    #[test]
    fn hole_is_complete_only_when_every_member_scored() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut card = ScoreCard::new(vec![a, b]);

        card.upsert_hole(
            hole(3),
            &[HoleEntry {
                player_id: a,
                strokes: strokes(4),
            }],
        )
        .unwrap();
        assert!(!card.hole_complete(hole(3)));
        assert_eq!(card.missing_players(hole(3)), vec![b]);

        card.upsert_hole(
            hole(3),
            &[HoleEntry {
                player_id: b,
                strokes: strokes(5),
            }],
        )
        .unwrap();
        assert!(card.hole_complete(hole(3)));
        assert!(card.missing_players(hole(3)).is_empty());
    }

    #[test]
    fn upsert_overwrites_without_duplicating() {
        let a = Uuid::new_v4();
        let mut card = ScoreCard::new(vec![a]);
        let entry = |n| HoleEntry {
            player_id: a,
            strokes: strokes(n),
        };

        card.upsert_hole(hole(1), &[entry(6)]).unwrap();
        card.upsert_hole(hole(1), &[entry(5)]).unwrap();

        assert_eq!(card.strokes(a, hole(1)), Some(strokes(5)));
        assert_eq!(card.rows().count(), 1);
    }

    #[test]
    fn upsert_is_all_or_nothing() {
        let a = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let mut card = ScoreCard::new(vec![a]);

        let err = card
            .upsert_hole(
                hole(2),
                &[
                    HoleEntry {
                        player_id: a,
                        strokes: strokes(3),
                    },
                    HoleEntry {
                        player_id: stranger,
                        strokes: strokes(3),
                    },
                ],
            )
            .unwrap_err();

        assert_eq!(err, ScoreCardError::UnknownPlayer(stranger));
        assert_eq!(card.strokes(a, hole(2)), None);
    }

    #[test]
    fn duplicate_player_in_one_submission_is_rejected() {
        let a = Uuid::new_v4();
        let mut card = ScoreCard::new(vec![a]);
        let entry = HoleEntry {
            player_id: a,
            strokes: strokes(3),
        };

        assert_eq!(
            card.upsert_hole(hole(4), &[entry, entry]).unwrap_err(),
            ScoreCardError::DuplicatePlayer(a)
        );
    }

    #[test]
    fn player_holes_follow_official_order() {
        let a = Uuid::new_v4();
        let card = ScoreCard::from_rows(
            vec![a],
            [(a, hole(12), strokes(4)), (a, hole(2), strokes(3))],
        )
        .unwrap();

        assert_eq!(
            card.player_holes(a),
            vec![(hole(2), strokes(3)), (hole(12), strokes(4))]
        );
    }
}
