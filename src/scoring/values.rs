//! Validated value objects shared by the scoring engine.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Number of holes on every course handled by the engine.
pub const HOLES_PER_ROUND: usize = 18;

/// Raised when a raw number cannot be turned into one of the scoring value objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// Hole numbers live in `1..=18`.
    #[error("hole number must be between 1 and 18 (got {0})")]
    HoleNumber(i64),
    /// Par is restricted to 3, 4 or 5.
    #[error("par must be between 3 and 5 (got {0})")]
    Par(i64),
    /// Stroke index ranks holes 1 (hardest) to 18.
    #[error("stroke index must be between 1 and 18 (got {0})")]
    StrokeIndex(i64),
    /// Strokes must be a strictly positive integer.
    #[error("strokes must be a positive integer (got {0})")]
    Strokes(i64),
    /// Course handicap must be a non-negative integer.
    #[error("course handicap must be a non-negative integer (got {0})")]
    CourseHandicap(i64),
}

macro_rules! bounded_value {
    ($(#[$meta:meta])* $name:ident, $min:expr, $max:expr, $err:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(try_from = "i64", into = "u8")]
        pub struct $name(u8);

        impl $name {
            /// Raw numeric value.
            pub const fn get(self) -> u8 {
                self.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = ValueError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                if (($min as i64)..=($max as i64)).contains(&value) {
                    Ok(Self(value as u8))
                } else {
                    Err(ValueError::$err(value))
                }
            }
        }

        impl TryFrom<u8> for $name {
            type Error = ValueError;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                Self::try_from(i64::from(value))
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

bounded_value!(
    /// Official hole number on a course (1 to 18).
    HoleNumber,
    1,
    18,
    HoleNumber
);

bounded_value!(
    /// Par of a hole.
    Par,
    3,
    5,
    Par
);

bounded_value!(
    /// Difficulty ranking of a hole, 1 being the hardest.
    StrokeIndex,
    1,
    18,
    StrokeIndex
);

bounded_value!(
    /// Strokes played on a hole by one player.
    Strokes,
    1,
    u8::MAX,
    Strokes
);

bounded_value!(
    /// Strokes a player may subtract over the round.
    CourseHandicap,
    0,
    u8::MAX,
    CourseHandicap
);

impl HoleNumber {
    /// Every hole of a round in official order.
    pub fn all() -> impl Iterator<Item = HoleNumber> {
        (1..=HOLES_PER_ROUND as u8).map(HoleNumber)
    }

    /// Hole at zero-based position `index` of the official order, wrapping past 18.
    pub const fn from_index(index: usize) -> HoleNumber {
        HoleNumber((index % HOLES_PER_ROUND) as u8 + 1)
    }

    /// Zero-based position of the hole in the official 1..18 order.
    pub const fn index(self) -> usize {
        self.0 as usize - 1
    }
}

impl CourseHandicap {
    /// Scratch handicap, also used when a player has none on record.
    pub const ZERO: CourseHandicap = CourseHandicap(0);
}
