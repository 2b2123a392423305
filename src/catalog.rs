use itertools::Itertools;

use crate::builder::{BoardError, BuilderInvalidReason};
use crate::color::Color;
use crate::tile::{Slot, Tile, TileKind};

/// The set of tiles boards are generated from.
///
/// A catalog is an ordinary immutable value: build it once and lend it to [`BoardBuilder::generate`](crate::BoardBuilder::generate) as often as needed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TileCatalog {
    tiles: Vec<Tile>,
}

impl TileCatalog {
    /// Wrap a custom set of tiles.
    ///
    /// Every tile must have the same size and the catalog must cover all four [`TileKind`]s, since a generated board uses one tile of each.
    pub fn new(tiles: Vec<Tile>) -> Result<Self, BoardError> {
        let mut invalid_reasons = Vec::new();

        if tiles.iter().map(Tile::size).unique().count() > 1 {
            invalid_reasons.push(BuilderInvalidReason::SizeMismatch);
        }
        let kinds = tiles.iter().map(Tile::kind).unique().count();
        if kinds < 4 {
            invalid_reasons.push(BuilderInvalidReason::TooFewKinds(kinds));
        }

        if !invalid_reasons.is_empty() {
            return Err(BoardError::Configuration(invalid_reasons));
        }

        Ok(Self { tiles })
    }

    /// The four 8×8 tiles of the standard game, each drawn for its own quadrant.
    pub fn reference() -> Self {
        use Color::*;

        let tiles = vec![
            Tile::from_rows(
                [
                    [9, 1, 1, 3, 9, 1, 1, 1],
                    [8, 0, 0, 0, 0, 0, 0, 0],
                    [8, 0, 0, 0, 0, 6, 8, 0],
                    [8, 0, 4, 0, 0, 1, 0, 0],
                    [12, 0, 3, 8, 0, 0, 0, 0],
                    [9, 4, 0, 0, 0, 0, 2, 12],
                    [10, 9, 0, 0, 0, 0, 0, 5],
                    [8, 0, 0, 0, 0, 0, 2, 15],
                ],
                &[(21, Blue), (34, Green), (47, Red), (49, Yellow)],
                TileKind::Gear,
                Slot::TopLeft,
            ),
            Tile::from_rows(
                [
                    [1, 1, 1, 3, 9, 1, 1, 3],
                    [0, 0, 0, 0, 0, 0, 0, 2],
                    [0, 0, 0, 6, 8, 4, 0, 2],
                    [0, 0, 0, 1, 0, 3, 0, 2],
                    [0, 2, 12, 0, 4, 0, 0, 2],
                    [0, 0, 1, 2, 9, 0, 0, 6],
                    [4, 0, 0, 0, 0, 0, 0, 3],
                    [15, 8, 0, 0, 0, 0, 0, 2],
                ],
                &[(19, Red), (29, Yellow), (34, Green), (44, Blue)],
                TileKind::Planet,
                Slot::TopRight,
            ),
            Tile::from_rows(
                [
                    [15, 8, 0, 0, 0, 0, 0, 2],
                    [1, 0, 0, 0, 0, 2, 12, 2],
                    [0, 6, 8, 0, 4, 0, 1, 2],
                    [0, 1, 0, 2, 9, 0, 0, 6],
                    [4, 0, 0, 0, 0, 0, 0, 3],
                    [9, 0, 4, 0, 0, 0, 0, 2],
                    [0, 0, 3, 8, 0, 0, 0, 2],
                    [4, 4, 4, 4, 6, 12, 4, 6],
                ],
                &[(14, Yellow), (17, Green), (28, Red), (40, Grey), (50, Blue)],
                TileKind::Star,
                Slot::BottomRight,
            ),
            Tile::from_rows(
                [
                    [8, 4, 0, 0, 0, 4, 2, 15],
                    [8, 3, 8, 0, 2, 9, 0, 1],
                    [12, 0, 0, 0, 0, 0, 0, 0],
                    [9, 0, 0, 0, 0, 0, 0, 0],
                    [8, 0, 0, 0, 0, 0, 6, 8],
                    [8, 0, 0, 0, 0, 0, 1, 0],
                    [8, 2, 12, 0, 0, 0, 0, 0],
                    [12, 4, 5, 4, 4, 6, 12, 4],
                ],
                &[(9, Yellow), (13, Blue), (38, Red), (50, Green)],
                TileKind::Circle,
                Slot::BottomLeft,
            ),
        ];

        Self { tiles }
    }

    /// Every tile, in the order given.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// The first tile of the given kind.
    pub fn get(&self, kind: TileKind) -> Option<&Tile> {
        self.tiles.iter().find(|tile| tile.kind() == kind)
    }

    /// All tiles of the given kind, in catalog order.
    pub(crate) fn of_kind(&self, kind: TileKind) -> Vec<&Tile> {
        self.tiles.iter().filter(|tile| tile.kind() == kind).collect_vec()
    }
}
