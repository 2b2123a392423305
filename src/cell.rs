use strum::VariantArray;

use crate::step::Step;

/// The walls around one cell, as a 4-bit mask: 1 = up, 2 = right, 4 = down, 8 = left.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Walls(u8);

impl Walls {
    /// A cell with no walls.
    pub const NONE: Self = Self(0);
    /// A cell walled in on every side. Such cells are unusable and never hold a robot.
    pub const ENCLOSED: Self = Self(15);

    /// Wrap a raw mask, rejecting values above 15.
    pub fn new(bits: u8) -> Option<Self> {
        (bits <= Self::ENCLOSED.0).then_some(Self(bits))
    }

    pub(crate) const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::ENCLOSED.0)
    }

    /// The raw mask.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Is there a wall on the `step` side of this cell?
    pub fn has(self, step: Step) -> bool {
        self.0 & step.wall_bit() != 0
    }

    /// Walled in on all four sides; no robot may stand here.
    pub fn is_enclosed(self) -> bool {
        self == Self::ENCLOSED
    }

    /// The same walls after a quarter turn clockwise: up becomes right, right becomes down and so on.
    pub fn rotated_clockwise(self) -> Self {
        Step::VARIANTS.iter()
            .filter(|step| self.has(**step))
            .fold(Self::NONE, |acc, step| Self(acc.0 | step.rotate_clockwise().wall_bit()))
    }
}
