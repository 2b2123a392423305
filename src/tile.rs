use ndarray::Array2;
use serde::{Deserialize, Serialize};
use strum::{Display, VariantArray};

use crate::builder::{BoardError, BuilderInvalidReason};
use crate::cell::Walls;
use crate::color::Color;
use crate::location::{Coord, Location};

/// A target cell for one robot colour.
///
/// `number` is the row-major index of the cell in whatever frame owns the goal: the tile while it sits in a [`Tile`], the whole board once assembled.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Goal {
    /// Row-major cell index.
    pub number: usize,
    /// Only the robot of this colour scores the goal.
    pub color: Color,
}

impl Goal {
    /// A goal of `color` at cell `number`.
    pub fn new(number: usize, color: Color) -> Self {
        Self { number, color }
    }

    /// The goal cell on a square frame of side `size`.
    pub fn location(&self, size: Coord) -> Location {
        Location::from_number(self.number, size)
    }
}

/// The four quadrants of a board, numbered clockwise from the top left.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, VariantArray)]
pub enum Slot {
    /// Rows and columns from 0.
    TopLeft,
    /// Rows from 0, columns from the middle.
    TopRight,
    /// Rows and columns from the middle.
    BottomRight,
    /// Rows from the middle, columns from 0.
    BottomLeft,
}

impl Slot {
    /// Position in clockwise order from [`TopLeft`](Slot::TopLeft).
    pub fn index(self) -> usize {
        match self {
            Self::TopLeft => 0,
            Self::TopRight => 1,
            Self::BottomRight => 2,
            Self::BottomLeft => 3,
        }
    }

    /// Inverse of [`index`](Self::index).
    pub fn from_index(index: usize) -> Option<Self> {
        Self::VARIANTS.get(index).copied()
    }

    pub(crate) fn is_bottom(self) -> bool {
        matches!(self, Self::BottomRight | Self::BottomLeft)
    }

    pub(crate) fn is_right(self) -> bool {
        matches!(self, Self::TopRight | Self::BottomRight)
    }

    /// Quarter turns clockwise that carry a tile from `self` to `target`.
    pub fn turns_to(self, target: Slot) -> usize {
        (target.index() + 4 - self.index()) % 4
    }

    fn turned(self, times: usize) -> Self {
        Self::VARIANTS[(self.index() + times) % 4]
    }
}

/// The printed motif that tells the physical tiles apart.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Display, VariantArray)]
#[strum(serialize_all = "lowercase")]
pub enum TileKind {
    /// Gear motif.
    Gear,
    /// Planet motif.
    Planet,
    /// Circle motif.
    Circle,
    /// Star motif.
    Star,
}

/// One square quadrant of a board: a wall grid plus the goals printed on it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Tile {
    pub(crate) cells: Array2<Walls>,
    pub(crate) goals: Vec<Goal>,
    kind: TileKind,
    slot: Slot,
}

impl Tile {
    /// Build a tile from a square wall grid.
    /// `slot` is the quadrant the grid is drawn for; rotating the tile moves it.
    pub fn new(cells: Array2<Walls>, goals: Vec<Goal>, kind: TileKind, slot: Slot) -> Result<Self, BoardError> {
        let mut invalid_reasons = Vec::new();
        if cells.is_empty() {
            invalid_reasons.push(BuilderInvalidReason::EmptyGrid);
        } else if cells.nrows() != cells.ncols() {
            invalid_reasons.push(BuilderInvalidReason::NotSquare);
        }
        invalid_reasons.extend(goals.iter()
            .filter(|goal| goal.number >= cells.len())
            .map(|goal| BuilderInvalidReason::GoalOutOfBounds(*goal)));

        if !invalid_reasons.is_empty() {
            return Err(BoardError::Configuration(invalid_reasons));
        }

        Ok(Self { cells, goals, kind, slot })
    }

    /// Infallible constructor for the fixed grids compiled into a [`TileCatalog`](crate::catalog::TileCatalog).
    pub(crate) fn from_rows<const N: usize>(rows: [[u8; N]; N], goals: &[(usize, Color)], kind: TileKind, slot: Slot) -> Self {
        Self {
            cells: Array2::from_shape_fn((N, N), |(row, column)| Walls::from_bits_truncate(rows[row][column])),
            goals: goals.iter().map(|(number, color)| Goal::new(*number, *color)).collect(),
            kind,
            slot,
        }
    }

    /// Length of one side.
    pub fn size(&self) -> Coord {
        self.cells.nrows()
    }

    /// Wall masks, indexed `[row, column]`.
    pub fn cells(&self) -> &Array2<Walls> {
        &self.cells
    }

    /// Goals printed on the tile, numbered in the tile's frame.
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    /// Which motif the tile carries.
    pub fn kind(&self) -> TileKind {
        self.kind
    }

    /// The quadrant the tile is currently oriented for.
    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// Rotate the tile 90° clockwise `times` times.
    ///
    /// The grid turns ring by ring from the outside in, every wall mask turns with its cell so walls keep facing the same physical neighbours, and goal numbers follow their cells.
    /// Four turns restore the original tile.
    pub fn rotate(&mut self, times: usize) -> &mut Self {
        let n = self.size();

        for _ in 0..times % 4 {
            for layer in 0..n / 2 {
                let first = layer;
                let last = n - 1 - layer;
                for i in first..last {
                    let offset = i - first;
                    let top = self.cells[[first, i]];

                    // left -> top
                    self.cells[[first, i]] = self.cells[[last - offset, first]].rotated_clockwise();
                    // bottom -> left
                    self.cells[[last - offset, first]] = self.cells[[last, last - offset]].rotated_clockwise();
                    // right -> bottom
                    self.cells[[last, last - offset]] = self.cells[[i, last]].rotated_clockwise();
                    // top -> right
                    self.cells[[i, last]] = top.rotated_clockwise();
                }
            }

            // odd sizes have a centre cell no ring visits
            if n % 2 == 1 {
                let centre = n / 2;
                self.cells[[centre, centre]] = self.cells[[centre, centre]].rotated_clockwise();
            }

            for goal in self.goals.iter_mut() {
                let Location(row, column) = goal.location(n);
                goal.number = Location(column, n - 1 - row).to_number(n);
            }
        }

        self.slot = self.slot.turned(times);
        self
    }
}
