use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

use arbitrary::Arbitrary;
use serde::Deserialize;
use serde::Serialize;
use strum::EnumCount;
use strum::EnumIter;

/// The Direction Pointer (DP). Rotating it clockwise cycles through
/// right → down → left → up → right.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    EnumCount,
    EnumIter,
    Serialize,
    Deserialize,
    Arbitrary,
)]
pub enum Direction {
    #[default]
    Right,
    Down,
    Left,
    Up,
}

/// The Codel Chooser (CC). Relative to the [`Direction`] the instruction
/// pointer faces, it selects which of several candidate edge codels is used
/// to leave a block.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    EnumCount,
    EnumIter,
    Serialize,
    Deserialize,
    Arbitrary,
)]
pub enum CodelChooser {
    #[default]
    Left,
    Right,
}

impl Direction {
    #[must_use]
    pub const fn rotated_clockwise(self) -> Self {
        match self {
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
            Direction::Up => Direction::Right,
        }
    }

    #[must_use]
    pub const fn rotated_counterclockwise(self) -> Self {
        match self {
            Direction::Right => Direction::Up,
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
        }
    }

    /// Rotate clockwise `num_rotations` times. Non-positive numbers of
    /// rotations leave the direction unchanged.
    #[must_use]
    pub fn rotated_by(self, num_rotations: i64) -> Self {
        let effective_rotations = num_rotations.max(0) % Direction::COUNT as i64;
        (0..effective_rotations).fold(self, |direction, _| direction.rotated_clockwise())
    }

    /// The unit step `(dx, dy)` of this direction. The y axis points down.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Up => (0, -1),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Up => "up",
        }
    }
}

impl CodelChooser {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            CodelChooser::Left => CodelChooser::Right,
            CodelChooser::Right => CodelChooser::Left,
        }
    }

    /// The absolute direction the codel chooser points to when the
    /// instruction pointer faces `direction`.
    pub const fn absolute(self, direction: Direction) -> Direction {
        match self {
            CodelChooser::Left => direction.rotated_counterclockwise(),
            CodelChooser::Right => direction.rotated_clockwise(),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            CodelChooser::Left => "left",
            CodelChooser::Right => "right",
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.name())
    }
}

impl Display for CodelChooser {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.name())
    }
}
