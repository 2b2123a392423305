//! Assembling boards from tiles.

use itertools::Itertools;
use ndarray::{concatenate, Array2, ArrayView2, Axis};
use rand::seq::SliceRandom;
use rand::Rng;
use strum::VariantArray;
use thiserror::Error;

use crate::board::Board;
use crate::catalog::TileCatalog;
use crate::cell::Walls;
use crate::color::Color;
use crate::location::Location;
use crate::tile::{Goal, Slot, Tile, TileKind};

/// Reasons a board or tile description may be rejected while building.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BuilderInvalidReason {
    /// A board is assembled from exactly four tiles; this many were given.
    WrongTileCount(usize),
    /// A second tile was placed into an occupied quadrant.
    SlotTaken(Slot),
    /// No tile was placed into this quadrant.
    SlotEmpty(Slot),
    /// Tiles of different sizes cannot be stitched together.
    SizeMismatch,
    /// A catalog must offer at least four distinct [`TileKind`]s; this many were found.
    TooFewKinds(usize),
    /// A grid without cells.
    EmptyGrid,
    /// A grid whose rows are not all as long as the grid is tall.
    NotSquare,
    /// A cell holds a value outside the 4-bit wall encoding.
    WallOutOfRange {
        /// The offending cell.
        location: Location,
        /// Its value, above 15.
        value: u8,
    },
    /// A goal refers to a cell outside the grid.
    GoalOutOfBounds(Goal),
    /// A robot colour is listed twice.
    DuplicateRobot(Color),
    /// A goal colour has no robot to reach it.
    MissingRobot(Color),
}

/// Structural failures while assembling a board or placing robots on it.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum BoardError {
    /// The tiles or grid handed in cannot form a board.
    #[error("invalid board configuration: {0:?}")]
    Configuration(Vec<BuilderInvalidReason>),
    /// Fewer open cells than robots.
    #[error("cannot place {robots} robots on {open} open cells")]
    InsufficientSpace {
        /// Cells a robot may stand on.
        open: usize,
        /// Robots to place.
        robots: usize,
    },
}

/// Assembles four [`Tile`]s into one square [`Board`].
///
/// Tiles are placed into quadrants one at a time and turned to fit; any mistake is recorded and reported by [`build`](Self::build).
/// Builders can be [`Clone`]d to save their state at some point.
#[derive(Clone, Debug, Default)]
pub struct BoardBuilder {
    slots: [Option<Tile>; 4],
    invalid_reasons: Vec<BuilderInvalidReason>,
}

impl BoardBuilder {
    /// An empty builder with all four quadrants free.
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn `tile` clockwise until it is oriented for `target`, then place it there.
    ///
    /// May cause the builder to enter a [`SlotTaken`](BuilderInvalidReason::SlotTaken) or [`SizeMismatch`](BuilderInvalidReason::SizeMismatch) invalid state.
    /// If the builder is already in an invalid state, this function does nothing.
    pub fn place(&mut self, mut tile: Tile, target: Slot) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        if self.slots[target.index()].is_some() {
            self.invalid_reasons.push(BuilderInvalidReason::SlotTaken(target));
            return self;
        }

        if self.slots.iter().flatten().any(|placed| placed.size() != tile.size()) {
            self.invalid_reasons.push(BuilderInvalidReason::SizeMismatch);
            return self;
        }

        tile.rotate(tile.slot().turns_to(target));
        self.slots[target.index()] = Some(tile);
        self
    }

    /// Check the validity of this builder.
    ///
    /// Returns `None` if the builder is valid so far, `Some(&Vec<BuilderInvalidReason>)` otherwise.
    pub fn is_valid(&self) -> Option<&Vec<BuilderInvalidReason>> {
        if self.invalid_reasons.is_empty() {
            None
        } else {
            Some(&self.invalid_reasons)
        }
    }

    /// Stitch the placed tiles together.
    ///
    /// Top-left and top-right rows are joined side by side, as are bottom-left and bottom-right, and the top half is stacked on the bottom half.
    /// Goal numbers move into the frame of the whole board, and the robot colours are the distinct goal colours in first-seen order.
    pub fn build(&self) -> Result<Board, BoardError> {
        if !self.invalid_reasons.is_empty() {
            return Err(BoardError::Configuration(self.invalid_reasons.clone()));
        }

        let empty = Slot::VARIANTS.iter()
            .filter(|slot| self.slots[slot.index()].is_none())
            .map(|slot| BuilderInvalidReason::SlotEmpty(*slot))
            .collect_vec();
        if !empty.is_empty() {
            return Err(BoardError::Configuration(empty));
        }

        let tiles = self.slots.iter().flatten().collect_vec();
        let [top_left, top_right, bottom_right, bottom_left] = tiles[..] else {
            return Err(BoardError::Configuration(vec![BuilderInvalidReason::WrongTileCount(tiles.len())]));
        };

        fn stitch<'v>(axis: usize, a: ArrayView2<'v, Walls>, b: ArrayView2<'v, Walls>) -> Result<Array2<Walls>, BoardError> {
            concatenate(Axis(axis), &[a, b])
                .map_err(|_| BoardError::Configuration(vec![BuilderInvalidReason::SizeMismatch]))
        }
        let top = stitch(1, top_left.cells.view(), top_right.cells.view())?;
        let bottom = stitch(1, bottom_left.cells.view(), bottom_right.cells.view())?;
        let cells = stitch(0, top.view(), bottom.view())?;

        let tile_size = top_left.size();
        let board_size = cells.nrows();
        let goals = Slot::VARIANTS.iter()
            .zip([top_left, top_right, bottom_right, bottom_left])
            .flat_map(|(slot, tile)| tile.goals.iter().map(move |goal| {
                let Location(row, column) = goal.location(tile_size);
                let row = if slot.is_bottom() { row + tile_size } else { row };
                let column = if slot.is_right() { column + tile_size } else { column };
                Goal::new(Location(row, column).to_number(board_size), goal.color)
            }))
            .collect_vec();
        let robot_colors = goals.iter().map(|goal| goal.color).unique().collect_vec();

        Ok(Board::new(cells, goals, robot_colors))
    }

    /// Assemble a board from exactly four tiles; the tile at index `i` goes into [`Slot::from_index(i)`](Slot::from_index).
    pub fn from_tiles(tiles: Vec<Tile>) -> Result<Board, BoardError> {
        if tiles.len() != Slot::VARIANTS.len() {
            return Err(BoardError::Configuration(vec![BuilderInvalidReason::WrongTileCount(tiles.len())]));
        }

        let mut builder = Self::new();
        for (tile, slot) in tiles.into_iter().zip(Slot::VARIANTS) {
            builder.place(tile, *slot);
        }
        builder.build()
    }

    /// Generate a random board: one tile of each of four kinds from `catalog`, shuffled over the quadrants.
    pub fn generate<R: Rng + ?Sized>(catalog: &TileCatalog, rng: &mut R) -> Result<Board, BoardError> {
        let mut kinds = TileKind::VARIANTS.iter()
            .filter(|kind| !catalog.of_kind(**kind).is_empty())
            .copied()
            .collect_vec();
        if kinds.len() < Slot::VARIANTS.len() {
            return Err(BoardError::Configuration(vec![BuilderInvalidReason::TooFewKinds(kinds.len())]));
        }
        kinds.shuffle(rng);

        let tiles = kinds.into_iter()
            .take(Slot::VARIANTS.len())
            .filter_map(|kind| catalog.of_kind(kind).choose(rng).map(|tile| (*tile).clone()))
            .collect_vec();
        Self::from_tiles(tiles)
    }
}
