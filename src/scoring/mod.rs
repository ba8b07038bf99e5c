//! Pure scoring engine: course layout, play order, score card, progression gate, handicap and ranking.

/// Course layout validation.
pub mod course;
/// Progression gate over a group's score card.
pub mod gate;
/// Handicap stroke allocation and net scores.
pub mod handicap;
/// Leaderboard aggregation and tie-break ranking.
pub mod leaderboard;
/// Per-group strokes keyed by player and hole.
pub mod scorecard;
/// Shotgun-start hole order.
pub mod sequence;
/// Validated numeric value objects.
pub mod values;
