use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

use arbitrary::Arbitrary;
use isa::orientation::CodelChooser;
use isa::orientation::Direction;
use serde::Deserialize;
use serde::Serialize;

/// The coordinate of a codel, measured in codels from the top-left corner of
/// the program image. The y axis points down.
///
/// Coordinates are not bounded by the image. A codel outside the image is a
/// legal value; it is simply never occupied by the instruction pointer.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    Arbitrary,
)]
pub struct Codel {
    pub x: i32,
    pub y: i32,
}

impl Codel {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighboring codel in the given direction.
    #[must_use]
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// How far the codel lies in the given direction. Larger is further.
    pub fn extent_in(self, direction: Direction) -> i64 {
        let (dx, dy) = direction.delta();
        i64::from(self.x) * i64::from(dx) + i64::from(self.y) * i64::from(dy)
    }
}

impl Display for Codel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Codel {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// The instruction pointer: the codel it currently occupies, the
/// [Direction Pointer](Direction), and the [Codel Chooser](CodelChooser).
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    Arbitrary,
)]
pub struct Pointer {
    pub codel: Codel,
    pub dp: Direction,
    pub cc: CodelChooser,
}

impl Pointer {
    /// The pointer every program starts with: top-left codel, facing right,
    /// choosing left.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move back to the initial position and orientation.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn rotate_dp(&mut self) {
        self.dp = self.dp.rotated_clockwise();
    }

    /// Rotate the direction pointer clockwise `num_rotations` times. Does
    /// nothing if `num_rotations` is not positive.
    pub fn rotate_dp_by(&mut self, num_rotations: i64) {
        self.dp = self.dp.rotated_by(num_rotations);
    }

    pub fn toggle_cc(&mut self) {
        self.cc = self.cc.toggled();
    }

    pub fn move_to(&mut self, codel: Codel) {
        self.codel = codel;
    }

    /// The codel adjacent to the current one in the direction the pointer
    /// faces.
    pub fn ahead(&self) -> Codel {
        self.codel.step(self.dp)
    }
}

impl Display for Pointer {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} DP: {} CC: {}", self.codel, self.dp, self.cc)
    }
}

#[cfg(test)]
mod tests {
    use assert2::assert;
    use proptest::prelude::*;
    use proptest_arbitrary_interop::arb;
    use test_strategy::proptest;

    use super::*;

    #[test]
    fn new_pointer_starts_top_left_facing_right_choosing_left() {
        let pointer = Pointer::new();
        assert!(Codel::new(0, 0) == pointer.codel);
        assert!(Direction::Right == pointer.dp);
        assert!(CodelChooser::Left == pointer.cc);
    }

    #[proptest]
    fn clearing_restores_initial_pointer(#[strategy(arb())] mut pointer: Pointer) {
        pointer.clear();
        prop_assert_eq!(Pointer::new(), pointer);
    }

    #[proptest]
    fn rotating_dp_leaves_codel_and_cc_alone(
        #[strategy(arb())] mut pointer: Pointer,
        #[strategy(-10_i64..10)] num_rotations: i64,
    ) {
        let before = pointer;
        pointer.rotate_dp_by(num_rotations);
        prop_assert_eq!(before.codel, pointer.codel);
        prop_assert_eq!(before.cc, pointer.cc);
    }

    #[test]
    fn rotating_dp_twice_turns_around() {
        let mut pointer = Pointer::new();
        pointer.rotate_dp();
        assert!(Direction::Down == pointer.dp);
        pointer.rotate_dp();
        assert!(Direction::Left == pointer.dp);
    }

    #[test]
    fn stepping_follows_direction_with_y_pointing_down() {
        let codel = Codel::new(3, 3);
        assert!(Codel::new(4, 3) == codel.step(Direction::Right));
        assert!(Codel::new(3, 4) == codel.step(Direction::Down));
        assert!(Codel::new(2, 3) == codel.step(Direction::Left));
        assert!(Codel::new(3, 2) == codel.step(Direction::Up));
    }

    #[test]
    fn stepping_may_leave_the_image() {
        assert!(Codel::new(-1, 0) == Codel::new(0, 0).step(Direction::Left));
    }

    #[test]
    fn extent_grows_in_direction() {
        let codel = Codel::new(2, 5);
        assert!(codel.step(Direction::Up).extent_in(Direction::Up) > codel.extent_in(Direction::Up));
        assert!(-5 == codel.extent_in(Direction::Up));
        assert!(2 == codel.extent_in(Direction::Right));
    }

    #[test]
    fn display_shows_full_orientation() {
        let pointer = Pointer::new();
        assert!("(0, 0) DP: right CC: left" == pointer.to_string());
    }
}
