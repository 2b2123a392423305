//! JSON shapes shared with clients.
//!
//! Field names are fixed by the existing web client: camelCase keys, colours as lowercase strings, locations as `{row, column}` and goals as `{number, color}`.

use serde::{Deserialize, Serialize};

use crate::board::{Board, Move, RobotPosition};
use crate::builder::BoardError;
use crate::color::Color;
use crate::location::{Coord, Location};
use crate::round::PlayerId;
use crate::tile::Goal;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub(crate) struct WireLocation {
    row: Coord,
    column: Coord,
}

impl From<WireLocation> for Location {
    fn from(value: WireLocation) -> Self {
        Self(value.row, value.column)
    }
}

impl From<Location> for WireLocation {
    fn from(value: Location) -> Self {
        Self { row: value.row(), column: value.column() }
    }
}

/// A whole board as sent to clients or supplied by them.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardData {
    /// Wall masks, one inner list per row.
    pub cells: Vec<Vec<u8>>,
    /// Every goal, by cell index and colour.
    pub goals: Vec<Goal>,
    /// One robot plays per colour listed here.
    pub robot_colors: Vec<Color>,
}

impl From<&Board> for BoardData {
    fn from(board: &Board) -> Self {
        Self {
            cells: board.cells().rows().into_iter()
                .map(|row| row.iter().map(|walls| walls.bits()).collect())
                .collect(),
            goals: board.goals().to_vec(),
            robot_colors: board.robot_colors().to_vec(),
        }
    }
}

impl TryFrom<BoardData> for Board {
    type Error = BoardError;

    fn try_from(value: BoardData) -> Result<Self, Self::Error> {
        Board::from_parts(value.cells, value.goals, value.robot_colors)
    }
}

/// The board plus the live state of a round, as a late joiner needs it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameData {
    /// The board the game is played on.
    #[serde(flatten)]
    pub board: BoardData,
    /// Where each robot stands.
    pub robot_positions: Vec<RobotPosition>,
    /// [`None`] once the game is finished.
    pub current_goal: Option<Goal>,
}

impl GameData {
    /// Copy the board and live state into wire form.
    pub fn new(board: &Board, robot_positions: &[RobotPosition], current_goal: Option<Goal>) -> Self {
        Self {
            board: board.into(),
            robot_positions: robot_positions.to_vec(),
            current_goal,
        }
    }
}

/// Everything a round broadcasts, tagged by `action`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum RoundEvent {
    /// A game began on a fresh board.
    StartNewGame(GameData),
    /// A claim was accepted and is now the best.
    SolutionIn {
        /// Whole seconds until claims close.
        seconds_left: u64,
        /// Name of the claimant.
        current_winner: String,
        /// Id of the claimant.
        current_winner_id: PlayerId,
        /// Length of the claimed route.
        current_nr_moves: usize,
    },
    /// No more claims; the named player must now submit moves.
    ClosedForSolutions {
        /// The length of the move window, in whole seconds.
        seconds_left: u64,
        /// Name of the claim holder.
        current_winner: String,
        /// Id of the claim holder.
        current_winner_id: PlayerId,
    },
    /// The claim holder's route reached the goal.
    GoalWonBy {
        /// Name of the winner.
        winner: String,
        /// The winning route.
        moves: Vec<Move>,
        /// Positions after the route.
        robot_positions: Vec<RobotPosition>,
    },
    /// The move window ran out without a valid submission.
    ClosedForMoves,
    /// Claims are open for the next goal.
    NewGoal {
        /// The goal now in play.
        goal: Goal,
        /// Robots stay where the last goal left them.
        robot_positions: Vec<RobotPosition>,
    },
    /// Every goal has been played.
    GameFinished,
}
