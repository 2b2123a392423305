use std::cmp::Ordering;

use strum::VariantArray;

use crate::location::Location;

/// One of the four directions a robot can slide in.
///
/// Each direction owns one bit of a [`Walls`](crate::cell::Walls) mask, and [`VARIANTS`](VariantArray::VARIANTS) lists them clockwise starting from [`Up`](Step::Up).
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum Step {
    /// Towards row 0.
    Up,
    /// Towards the last column.
    Right,
    /// Towards the last row.
    Down,
    /// Towards column 0.
    Left,
}

impl Step {
    /// The bit for a wall on this side of a cell.
    pub const fn wall_bit(self) -> u8 {
        match self {
            Self::Up => 1,
            Self::Right => 2,
            Self::Down => 4,
            Self::Left => 8,
        }
    }

    /// Attempt the step from `location` and return the neighbouring [`Location`], which may lie off the board.
    pub fn attempt_from(&self, location: Location) -> Location {
        match self {
            Self::Up => location.offset_by((-1, 0)),
            Self::Right => location.offset_by((0, 1)),
            Self::Down => location.offset_by((1, 0)),
            Self::Left => location.offset_by((0, -1)),
        }
    }

    /// The opposite direction.
    pub fn invert(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// The direction this one points in after a quarter turn clockwise.
    pub fn rotate_clockwise(&self) -> Self {
        match self {
            Self::Up => Self::Right,
            Self::Right => Self::Down,
            Self::Down => Self::Left,
            Self::Left => Self::Up,
        }
    }

    /// The direction of travel from `from` to `to`, if they share exactly one axis and differ along the other.
    pub fn between(from: Location, to: Location) -> Option<Self> {
        match (from.row().cmp(&to.row()), from.column().cmp(&to.column())) {
            (Ordering::Greater, Ordering::Equal) => Some(Self::Up),
            (Ordering::Less, Ordering::Equal) => Some(Self::Down),
            (Ordering::Equal, Ordering::Less) => Some(Self::Right),
            (Ordering::Equal, Ordering::Greater) => Some(Self::Left),
            // same cell or a diagonal
            _ => None,
        }
    }
}
