use ndarray::Ix;
use serde::{Deserialize, Serialize};

use crate::wire::WireLocation;

/// One coordinate on a board.
pub type Coord = usize;

#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug, Serialize, Deserialize)]
#[serde(from = "WireLocation", into = "WireLocation")]
/// A location `(row, column)` on a board. The top left corner is `Location(0, 0)`.
pub struct Location(pub Coord, pub Coord);

impl Location {
    /// The row, counted from the top.
    pub fn row(&self) -> Coord {
        self.0
    }

    /// The column, counted from the left.
    pub fn column(&self) -> Coord {
        self.1
    }

    /// Recover a location from its row-major `number` on a square board of side `size`.
    pub fn from_number(number: usize, size: Coord) -> Self {
        Self(number / size, number % size)
    }

    /// The row-major linear index of this location on a square board of side `size`.
    pub fn to_number(&self, size: Coord) -> usize {
        self.0 * size + self.1
    }

    pub(crate) fn as_index(&self) -> (Coord, Coord) {
        (self.0, self.1)
    }

    // stepping off the top or left edge wraps to a huge coordinate, which every grid lookup rejects
    pub(crate) fn offset_by(self, rhs: (isize, isize)) -> Self {
        Self(self.0.wrapping_add_signed(rhs.0), self.1.wrapping_add_signed(rhs.1))
    }

    /// Number of coordinates (0, 1 or 2) in which `self` and `other` differ.
    ///
    /// A slide changes exactly one coordinate, so this is a lower bound on the slides needed to get from one to the other.
    pub(crate) fn axis_distance(&self, other: Location) -> usize {
        usize::from(self.0 != other.0) + usize::from(self.1 != other.1)
    }
}

impl From<(Ix, Ix)> for Location {
    fn from(value: (Ix, Ix)) -> Self {
        Self(value.0, value.1)
    }
}
